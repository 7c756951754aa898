// Baseline fan-out: any peer other than the sender itself.

use super::FanoutPolicy;
use crate::node::NodeId;

#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl Unrestricted {
    pub const NAME: &'static str = "unrestricted";
}

impl FanoutPolicy for Unrestricted {
    fn admits(&self, candidate: NodeId, sender: NodeId, _source: Option<NodeId>) -> bool {
        candidate != sender
    }

    fn excluded_peers(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn clone_box(&self) -> Box<dyn FanoutPolicy> {
        Box::new(*self)
    }
}
