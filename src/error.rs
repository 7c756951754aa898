use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("nodes count must be a positive integer")]
    ZeroNodes,
    #[error("gossip runs must be a positive integer")]
    ZeroRuns,
    #[error("fan-out must be a positive integer")]
    ZeroFanout,
    #[error(
        "{nodes} nodes are too few for fan-out {fanout} under the {policy} policy \
         (need at least {required})"
    )]
    PopulationTooSmall {
        nodes: usize,
        fanout: usize,
        policy: String,
        required: usize,
    },
    #[error("unknown fan-out policy: {0}")]
    UnknownPolicy(String),
    #[error("cannot sample {fanout} distinct recipients from {available} candidates")]
    NotEnoughPeers { available: usize, fanout: usize },
}
