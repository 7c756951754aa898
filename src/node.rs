use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A gossip participant. `transmits` is only ever set together with `received`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Node {
    received: bool,
    transmits: bool,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> bool {
        self.received
    }

    pub fn transmits(&self) -> bool {
        self.transmits
    }

    pub fn reset(&mut self) {
        self.received = false;
        self.transmits = false;
    }

    /// Hands the message to this node. Returns false if it already had it.
    pub fn deliver(&mut self) -> bool {
        if self.received {
            return false;
        }
        self.received = true;
        self.transmits = true;
        true
    }

    pub fn finish_transmit(&mut self) {
        self.transmits = false;
    }
}

/// Fixed-size, ordered set of nodes. Order is stable for the lifetime of the population.
#[derive(Debug, Clone)]
pub struct Population {
    nodes: Vec<Node>,
}

impl Population {
    pub fn new(size: usize) -> Self {
        Self {
            nodes: vec![Node::new(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Marks `id` as the initial holder of the message.
    pub fn seed(&mut self, id: NodeId) {
        self.nodes[id.index()].deliver();
    }

    /// Sends from `sender` to every recipient, then clears the sender's transmit flag.
    /// Returns the recipients that had not seen the message before.
    pub fn send_to(&mut self, sender: NodeId, recipients: &[NodeId]) -> Vec<NodeId> {
        let delivered = recipients
            .iter()
            .copied()
            .filter(|&recipient| self.nodes[recipient.index()].deliver())
            .collect();
        self.nodes[sender.index()].finish_transmit();
        delivered
    }

    /// First node at or after `from` that is scheduled to transmit.
    pub fn next_transmitter(&self, from: usize) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, node)| node.transmits)
            .map(|(index, _)| NodeId::new(index))
    }

    pub fn received_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.received).count()
    }

    pub fn all_received(&self) -> bool {
        self.nodes.iter().all(|node| node.received)
    }

    pub fn any_transmitting(&self) -> bool {
        self.nodes.iter().any(|node| node.transmits)
    }
}
