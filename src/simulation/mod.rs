pub mod config;
pub use config::{SimConfig, DEFAULT_FANOUT};

use crate::error::{Result, SimError};
use crate::metrics::{GossipStats, TrialRecord};
use crate::node::{Node, NodeId, Population};
use crate::policy::FanoutPolicy;
use crate::sampler::{RngSampler, Sampler};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// A single forwarding step: `sender` picked `recipients`, of which `delivered`
/// had not seen the message yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    pub level: usize,
    pub sender: NodeId,
    pub source: Option<NodeId>,
    pub recipients: Vec<NodeId>,
    pub delivered: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialTrace {
    pub seed: NodeId,
    pub success: bool,
    pub rounds: u64,
    pub transmissions: Vec<Transmission>,
}

impl TrialTrace {
    pub fn received_count(&self) -> usize {
        1 + self
            .transmissions
            .iter()
            .map(|t| t.delivered.len())
            .sum::<usize>()
    }
}

// One level of the depth-first scan. `source` is the node that transmitted one
// level up, `counted` is set once this level has bumped the iteration counter.
#[derive(Debug)]
struct ScanFrame {
    cursor: usize,
    source: Option<NodeId>,
    counted: bool,
}

impl ScanFrame {
    fn new(source: Option<NodeId>) -> Self {
        Self {
            cursor: 0,
            source,
            counted: false,
        }
    }
}

/// Repeated-trial gossip propagation over a fixed population.
///
/// Multicast is depth-first: after a node transmits, the whole population is
/// rescanned from the start before the outer scan moves on. A scan level
/// increments `total_iterations` once, on the first transmitter it finds.
/// Levels are kept on an explicit stack instead of the call stack, since the
/// depth grows with the number of nodes reached.
pub struct Simulation<S = RngSampler<StdRng>> {
    config: SimConfig,
    policy: Box<dyn FanoutPolicy>,
    population: Population,
    sampler: S,
    stats: GossipStats,
}

impl Simulation {
    /// Seeded from `config.seed` when present, otherwise from OS entropy.
    pub fn new(config: SimConfig) -> Result<Self> {
        let sampler = match config.seed {
            Some(seed) => RngSampler::seeded(seed),
            None => RngSampler::from_entropy(),
        };
        Self::with_sampler(config, sampler)
    }
}

impl<S: Sampler> Simulation<S> {
    pub fn with_sampler(config: SimConfig, sampler: S) -> Result<Self> {
        let policy = config.validate()?;
        Self::with_policy(config, policy, sampler)
    }

    /// Uses `policy` instead of looking `config.policy_name` up in the global registry.
    pub fn with_policy(
        mut config: SimConfig,
        policy: Box<dyn FanoutPolicy>,
        sampler: S,
    ) -> Result<Self> {
        config.validate_for(policy.as_ref())?;
        config.policy_name = policy.name().to_string();
        let population = Population::new(config.nodes_count);
        Ok(Self {
            config,
            policy,
            population,
            sampler,
            stats: GossipStats::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn nodes(&self) -> &[Node] {
        self.population.nodes()
    }

    pub fn stats(&self) -> GossipStats {
        self.stats
    }

    pub fn total_success_rate(&self) -> f64 {
        self.stats.total_success_rate
    }

    pub fn total_iterations(&self) -> u64 {
        self.stats.total_iterations
    }

    /// Clears node state and the iteration counter. The success rate is left alone.
    pub fn reset(&mut self) {
        self.population.reset();
        self.stats.reset_iterations();
    }

    /// Runs one trial and reports whether every node got the message.
    pub fn spread_gossip(&mut self) -> Result<bool> {
        Ok(self.spread_gossip_traced()?.success)
    }

    pub fn spread_gossip_traced(&mut self) -> Result<TrialTrace> {
        self.population.reset();

        let seed = NodeId::new(self.sampler.choose(self.population.len()));
        self.population.seed(seed);

        let before = self.stats.total_iterations;
        let transmissions = self.multicast()?;

        Ok(TrialTrace {
            seed,
            success: self.population.all_received(),
            rounds: self.stats.total_iterations - before,
            transmissions,
        })
    }

    /// Executes `gossip_runs` trials and records the fraction that reached everyone.
    pub fn run(&mut self) -> Result<()> {
        self.run_with(|_| {})
    }

    pub fn run_with<F>(&mut self, mut observer: F) -> Result<()>
    where
        F: FnMut(&TrialRecord),
    {
        info!("Starting simulation: {}", self.config.name);
        info!(
            "Policy: {}, Nodes: {}, Runs: {}, Fan-out: {}",
            self.policy.name(),
            self.config.nodes_count,
            self.config.gossip_runs,
            self.config.fanout
        );

        let mut successful = 0;
        for trial in 0..self.config.gossip_runs {
            let trace = self.spread_gossip_traced()?;
            if trace.success {
                successful += 1;
            }

            let received = self.population.received_count();
            let record = TrialRecord {
                trial,
                seed_node: trace.seed.index(),
                success: trace.success,
                received,
                coverage: received as f64 / self.population.len() as f64,
                rounds: trace.rounds,
            };
            debug!(
                "Trial {}: seed {}, reached {}/{}, rounds {}",
                trial,
                trace.seed,
                received,
                self.population.len(),
                trace.rounds
            );
            observer(&record);
        }

        self.stats.record_run(successful, self.config.gossip_runs);
        info!(
            "Success rate: {:.2}% | Total iterations: {}",
            self.stats.total_success_rate * 100.0,
            self.stats.total_iterations
        );
        Ok(())
    }

    fn multicast(&mut self) -> Result<Vec<Transmission>> {
        let mut transmissions = Vec::new();
        let mut stack = vec![ScanFrame::new(None)];

        while let Some(frame) = stack.last_mut() {
            let Some(sender) = self.population.next_transmitter(frame.cursor) else {
                stack.pop();
                continue;
            };

            frame.cursor = sender.index() + 1;
            let source = frame.source;
            let first_at_level = !frame.counted;
            frame.counted = true;
            let level = stack.len() - 1;

            let recipients = self.pick_recipients(sender, source)?;
            let delivered = self.population.send_to(sender, &recipients);
            if first_at_level {
                self.stats.record_round();
            }

            trace!(
                "Level {}: {} -> {:?} ({} new)",
                level,
                sender,
                recipients,
                delivered.len()
            );
            transmissions.push(Transmission {
                level,
                sender,
                source,
                recipients,
                delivered,
            });

            // The nested scan sees the sender as its source.
            stack.push(ScanFrame::new(Some(sender)));
        }

        Ok(transmissions)
    }

    fn pick_recipients(&mut self, sender: NodeId, source: Option<NodeId>) -> Result<Vec<NodeId>> {
        let pool: Vec<NodeId> = self
            .population
            .ids()
            .filter(|&candidate| self.policy.admits(candidate, sender, source))
            .collect();

        let fanout = self.config.fanout;
        if pool.len() < fanout {
            return Err(SimError::NotEnoughPeers {
                available: pool.len(),
                fanout,
            });
        }

        Ok(self
            .sampler
            .sample(pool.len(), fanout)
            .into_iter()
            .map(|position| pool[position])
            .collect())
    }
}
