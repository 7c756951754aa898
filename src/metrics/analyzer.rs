use super::TrialRecord;
use crate::simulation::SimConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub name: String,
    pub policy_name: String,
    pub nodes_count: usize,
    pub gossip_runs: u64,
    pub fanout: usize,
    pub seed: Option<u64>,
    pub success_rate: f64,
    pub total_iterations: u64,
    pub mean_rounds: f64,
    pub min_rounds: u64,
    pub max_rounds: u64,
    pub mean_coverage: f64,
    pub worst_coverage: f64,
}

impl AnalysisReport {
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub fn analyze(
    records: &[TrialRecord],
    config: &SimConfig,
    policy_name: &str,
    total_iterations: u64,
) -> AnalysisReport {
    let n = records.len().max(1) as f64;
    let successes = records.iter().filter(|r| r.success).count();

    AnalysisReport {
        name: config.name.clone(),
        policy_name: policy_name.to_string(),
        nodes_count: config.nodes_count,
        gossip_runs: config.gossip_runs,
        fanout: config.fanout,
        seed: config.seed,
        success_rate: successes as f64 / n,
        total_iterations,
        mean_rounds: records.iter().map(|r| r.rounds as f64).sum::<f64>() / n,
        min_rounds: records.iter().map(|r| r.rounds).min().unwrap_or(0),
        max_rounds: records.iter().map(|r| r.rounds).max().unwrap_or(0),
        mean_coverage: records.iter().map(|r| r.coverage).sum::<f64>() / n,
        worst_coverage: records.iter().map(|r| r.coverage).reduce(f64::min).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(trial: u64, received: usize, rounds: u64) -> TrialRecord {
        TrialRecord {
            trial,
            seed_node: 0,
            success: received == 10,
            received,
            coverage: received as f64 / 10.0,
            rounds,
        }
    }

    #[test]
    fn summarises_trials() {
        let config = SimConfig::default().with_nodes(10).with_runs(4);
        let records = vec![record(0, 10, 10), record(1, 9, 9), record(2, 10, 10), record(3, 8, 8)];

        let report = analyze(&records, &config, "unrestricted", 37);

        assert_eq!(report.success_rate, 0.5);
        assert_eq!(report.total_iterations, 37);
        assert_eq!(report.min_rounds, 8);
        assert_eq!(report.max_rounds, 10);
        assert!((report.mean_rounds - 9.25).abs() < 1e-9);
        assert!((report.worst_coverage - 0.8).abs() < 1e-9);
    }

    #[test]
    fn report_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let config = SimConfig::default();
        let report = analyze(&[record(0, 10, 10)], &config, "unrestricted", 10);

        report.save_json(&path).unwrap();
        let loaded: AnalysisReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.policy_name, "unrestricted");
        assert_eq!(loaded.success_rate, 1.0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let report = analyze(&[], &SimConfig::default(), "unrestricted", 0);
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.worst_coverage, 0.0);
    }
}
