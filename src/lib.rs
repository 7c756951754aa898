pub mod error;
pub mod node;
pub mod sampler;
pub mod policy;
pub mod metrics;
pub mod simulation;

pub use error::{Result, SimError};
pub use node::{Node, NodeId, Population};
pub use policy::FanoutPolicy;
pub use simulation::{Simulation, SimConfig};
pub use metrics::GossipStats;

pub mod prelude {
    pub use crate::error::SimError;
    pub use crate::node::{Node, NodeId};
    pub use crate::policy::{FanoutPolicy, PolicyRegistry};
    pub use crate::sampler::{RngSampler, Sampler};
    pub use crate::simulation::{DEFAULT_FANOUT, Simulation, SimConfig, TrialTrace, Transmission};
    pub use crate::metrics::{GossipStats, TrialRecord};
}
