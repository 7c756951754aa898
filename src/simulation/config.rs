use crate::error::{Result, SimError};
use crate::policy::{self, FanoutPolicy, PolicyRegistry};
use serde::{Deserialize, Serialize};

/// Number of distinct peers a transmitting node forwards to.
pub const DEFAULT_FANOUT: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub name: String,
    pub nodes_count: usize,
    pub gossip_runs: u64,
    pub fanout: usize,
    pub policy_name: String,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "gossip".to_string(),
            nodes_count: 20,
            gossip_runs: 1000,
            fanout: DEFAULT_FANOUT,
            policy_name: policy::policy_for_flag(false).to_string(),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_nodes(mut self, nodes_count: usize) -> Self {
        self.nodes_count = nodes_count;
        self
    }

    pub fn with_runs(mut self, gossip_runs: u64) -> Self {
        self.gossip_runs = gossip_runs;
        self
    }

    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy_name = policy.into();
        self
    }

    pub fn with_advanced_algo(self, advanced_algo: bool) -> Self {
        self.with_policy(policy::policy_for_flag(advanced_algo))
    }

    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the parameters and resolves the configured policy from the global registry.
    pub fn validate(&self) -> Result<Box<dyn FanoutPolicy>> {
        let policy = PolicyRegistry::global()
            .create(&self.policy_name)
            .ok_or_else(|| SimError::UnknownPolicy(self.policy_name.clone()))?;
        self.validate_for(policy.as_ref())?;
        Ok(policy)
    }

    /// Checks the parameters against an already constructed policy.
    pub fn validate_for(&self, policy: &dyn FanoutPolicy) -> Result<()> {
        if self.nodes_count == 0 {
            return Err(SimError::ZeroNodes);
        }
        if self.gossip_runs == 0 {
            return Err(SimError::ZeroRuns);
        }
        if self.fanout == 0 {
            return Err(SimError::ZeroFanout);
        }

        let required = policy.min_population(self.fanout);
        if self.nodes_count < required {
            return Err(SimError::PopulationTooSmall {
                nodes: self.nodes_count,
                fanout: self.fanout,
                policy: policy.name().to_string(),
                required,
            });
        }
        Ok(())
    }
}
