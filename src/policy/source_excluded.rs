// "Advanced" fan-out: a node never echoes the message straight back to the
// node that transmitted one level above it. Earlier ancestors stay eligible.

use super::FanoutPolicy;
use crate::node::NodeId;

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceExcluded;

impl SourceExcluded {
    pub const NAME: &'static str = "source-excluded";
}

impl FanoutPolicy for SourceExcluded {
    fn admits(&self, candidate: NodeId, sender: NodeId, source: Option<NodeId>) -> bool {
        candidate != sender && Some(candidate) != source
    }

    fn excluded_peers(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn clone_box(&self) -> Box<dyn FanoutPolicy> {
        Box::new(*self)
    }
}
