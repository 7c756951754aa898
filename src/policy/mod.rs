pub mod unrestricted;
pub mod source_excluded;

use crate::node::NodeId;
use std::collections::HashMap;
use std::fmt;

pub use source_excluded::SourceExcluded;
pub use unrestricted::Unrestricted;

/// Decides which peers a transmitting node may pick as recipients.
pub trait FanoutPolicy: Send + Sync + fmt::Debug {
    /// Whether `candidate` may receive from `sender`, where `source` is the node
    /// that transmitted one level above `sender` (none for the seed level).
    fn admits(&self, candidate: NodeId, sender: NodeId, source: Option<NodeId>) -> bool;

    /// Peers this policy can rule out besides the sender itself.
    fn excluded_peers(&self) -> usize;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn FanoutPolicy>;

    /// Smallest population that can always supply `fanout` distinct recipients.
    fn min_population(&self, fanout: usize) -> usize {
        fanout + 1 + self.excluded_peers()
    }
}

impl Clone for Box<dyn FanoutPolicy> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub struct PolicyRegistry {
    policies: HashMap<String, Box<dyn Fn() -> Box<dyn FanoutPolicy> + Send + Sync>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            policies: HashMap::new(),
        };
        registry.register_builtin();
        registry
    }

    fn register_builtin(&mut self) {
        self.register(Unrestricted::NAME, || Box::new(Unrestricted));
        self.register("baseline", || Box::new(Unrestricted));
        self.register(SourceExcluded::NAME, || Box::new(SourceExcluded));
        self.register("advanced", || Box::new(SourceExcluded));
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn FanoutPolicy> + Send + Sync + 'static,
    {
        self.policies.insert(name.to_lowercase(), Box::new(factory));
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn FanoutPolicy>> {
        self.policies
            .get(&name.to_lowercase())
            .map(|factory| factory())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.policies.keys().cloned().collect();
        names.sort();
        names
    }

    /// Canonical policy names, one per distinct behaviour, skipping aliases.
    pub fn distinct(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .policies
            .values()
            .map(|factory| factory().name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn global() -> &'static PolicyRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<PolicyRegistry> = OnceLock::new();
        REGISTRY.get_or_init(PolicyRegistry::new)
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the policy selected by the `--advanced-algo` switch.
pub fn policy_for_flag(advanced_algo: bool) -> &'static str {
    if advanced_algo {
        SourceExcluded::NAME
    } else {
        Unrestricted::NAME
    }
}
