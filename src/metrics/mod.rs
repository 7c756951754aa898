pub mod logger;
pub mod analyzer;

use serde::{Deserialize, Serialize};

/// Statistics owned by the engine. They accumulate across trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GossipStats {
    pub total_success_rate: f64,
    pub total_iterations: u64,
    /// Trials and successes behind `total_success_rate` (last run only).
    pub trials: u64,
    pub successes: u64,
}

impl GossipStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_round(&mut self) {
        self.total_iterations += 1;
    }

    pub fn record_run(&mut self, successful: u64, runs: u64) {
        self.trials = runs;
        self.successes = successful;
        self.total_success_rate = if runs > 0 {
            successful as f64 / runs as f64
        } else {
            0.0
        };
    }

    /// Zeroes the iteration counter only; the last run's success figures are kept.
    pub fn reset_iterations(&mut self) {
        self.total_iterations = 0;
    }
}

/// One row per trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: u64,
    pub seed_node: usize,
    pub success: bool,
    pub received: usize,
    pub coverage: f64,
    pub rounds: u64,
}
