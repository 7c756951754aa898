// Property and scenario tests for the propagation engine:
// 1. A trial always reaches a fixpoint with nobody left transmitting
// 2. Delivery is monotonic (no node receives twice within a trial)
// 3. Iteration counting follows the depth-first scan levels
// 4. Policies differ only in whether a node can echo back to its source

#![allow(clippy::unwrap_used)]

use gossipsim::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn policy_strategy() -> impl Strategy<Value = bool> {
    any::<bool>()
}

fn seeded(nodes: usize, runs: u64, advanced: bool, seed: u64) -> Simulation {
    let config = SimConfig::default()
        .with_nodes(nodes)
        .with_runs(runs)
        .with_advanced_algo(advanced)
        .with_seed(seed);
    Simulation::new(config).unwrap()
}

proptest! {
    #[test]
    fn trial_reaches_fixpoint(
        nodes in 6usize..48,
        seed in any::<u64>(),
        advanced in policy_strategy(),
    ) {
        let mut sim = seeded(nodes, 1, advanced, seed);
        let trace = sim.spread_gossip_traced().unwrap();

        prop_assert!(sim.nodes().iter().all(|n| !n.transmits()));
        prop_assert_eq!(trace.success, sim.nodes().iter().all(|n| n.received()));
        let received = sim.nodes().iter().filter(|n| n.received()).count();
        prop_assert_eq!(trace.received_count(), received);
    }

    #[test]
    fn delivery_is_monotonic(
        nodes in 6usize..48,
        seed in any::<u64>(),
        advanced in policy_strategy(),
    ) {
        let mut sim = seeded(nodes, 1, advanced, seed);
        let trace = sim.spread_gossip_traced().unwrap();

        let mut seen = HashSet::from([trace.seed]);
        for transmission in &trace.transmissions {
            prop_assert!(seen.contains(&transmission.sender));
            prop_assert_eq!(transmission.recipients.len(), DEFAULT_FANOUT);
            prop_assert!(!transmission.recipients.contains(&transmission.sender));
            for delivered in &transmission.delivered {
                prop_assert!(seen.insert(*delivered), "{} delivered twice", delivered);
            }
        }
    }

    #[test]
    fn every_scan_level_counts_one_round(
        nodes in 6usize..48,
        seed in any::<u64>(),
        advanced in policy_strategy(),
    ) {
        let mut sim = seeded(nodes, 1, advanced, seed);
        let trace = sim.spread_gossip_traced().unwrap();

        // each nested scan drains all transmitters, so levels never repeat
        let levels: Vec<usize> = trace.transmissions.iter().map(|t| t.level).collect();
        prop_assert_eq!(levels, (0..trace.transmissions.len()).collect::<Vec<_>>());
        prop_assert_eq!(trace.rounds as usize, trace.received_count());
        prop_assert_eq!(sim.total_iterations(), trace.rounds);
    }

    #[test]
    fn success_rate_is_bounded(
        runs in 1u64..40,
        seed in any::<u64>(),
        advanced in policy_strategy(),
    ) {
        let mut sim = seeded(12, runs, advanced, seed);
        let mut rounds = 0;
        let mut successes = 0;
        sim.run_with(|record| {
            rounds += record.rounds;
            successes += u64::from(record.success);
        }).unwrap();

        let rate = sim.total_success_rate();
        prop_assert!((0.0..=1.0).contains(&rate));
        prop_assert_eq!(rate, successes as f64 / runs as f64);
        prop_assert_eq!(sim.total_iterations(), rounds);
    }

    #[test]
    fn same_seed_same_trial(
        nodes in 6usize..32,
        seed in any::<u64>(),
        advanced in policy_strategy(),
    ) {
        let mut a = seeded(nodes, 1, advanced, seed);
        let mut b = seeded(nodes, 1, advanced, seed);

        for _ in 0..5 {
            prop_assert_eq!(a.spread_gossip_traced().unwrap(), b.spread_gossip_traced().unwrap());
        }
    }
}

#[test]
fn twenty_nodes_thousand_runs() {
    let mut sim = seeded(20, 1000, false, 2024);
    let mut reached = 0;
    sim.run_with(|record| reached += record.received as u64).unwrap();

    let rate = sim.total_success_rate();
    assert!(rate > 0.65 && rate < 0.95, "success rate {}", rate);
    // one iteration per transmitting node, not per synchronous round
    assert_eq!(sim.total_iterations(), reached);
    assert!(sim.total_iterations() > 19_000);
}

#[test]
fn smallest_population_always_succeeds() {
    let mut sim = seeded(5, 200, false, 9);
    sim.run().unwrap();

    assert_eq!(sim.total_success_rate(), 1.0);
    assert_eq!(sim.total_iterations(), 5 * 200);
}

#[test]
fn smallest_population_rejected_for_source_exclusion() {
    let config = SimConfig::default().with_nodes(5).with_advanced_algo(true);
    assert!(matches!(
        Simulation::new(config),
        Err(SimError::PopulationTooSmall { required: 6, .. })
    ));
}

#[test]
fn source_exclusion_never_echoes() {
    let mut plain = seeded(20, 1, false, 77);
    let mut advanced = seeded(20, 1, true, 77);
    let mut plain_echoes = 0;

    for _ in 0..300 {
        for t in advanced.spread_gossip_traced().unwrap().transmissions {
            if let Some(source) = t.source {
                assert!(!t.recipients.contains(&source), "{} echoed to {}", t.sender, source);
            }
        }
        plain_echoes += plain
            .spread_gossip_traced()
            .unwrap()
            .transmissions
            .iter()
            .filter(|t| t.source.is_some_and(|s| t.recipients.contains(&s)))
            .count();
    }

    assert!(plain_echoes > 0);
}

#[test]
fn iterations_accumulate_until_reset() {
    let mut sim = seeded(20, 50, false, 5);
    sim.run().unwrap();
    let first = sim.total_iterations();

    let mut previous = first;
    for _ in 0..10 {
        sim.spread_gossip().unwrap();
        assert!(sim.total_iterations() > previous);
        previous = sim.total_iterations();
    }

    sim.run().unwrap();
    assert!(sim.total_iterations() > previous);

    let rate = sim.total_success_rate();
    sim.reset();
    assert_eq!(sim.total_iterations(), 0);
    assert_eq!(sim.total_success_rate(), rate);
}

#[test]
fn scripted_sampler_drives_engine() {
    struct FirstK;

    impl Sampler for FirstK {
        fn choose(&mut self, _len: usize) -> usize {
            0
        }

        fn sample(&mut self, _len: usize, amount: usize) -> Vec<usize> {
            (0..amount).collect()
        }
    }

    // 0 -> {1,2,3,4}, then each sender picks the lowest four peers and 5.. stay dark
    let config = SimConfig::default().with_nodes(8).with_runs(3);
    let mut sim = Simulation::with_sampler(config, FirstK).unwrap();
    sim.run().unwrap();

    assert_eq!(sim.total_success_rate(), 0.0);
    assert_eq!(sim.total_iterations(), 3 * 5);
    let reached: Vec<bool> = sim.nodes().iter().map(|n| n.received()).collect();
    assert_eq!(reached, vec![true, true, true, true, true, false, false, false]);
}
