// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use gossipsim::metrics::analyzer::{self, AnalysisReport};
use gossipsim::metrics::logger::TrialLogger;
use gossipsim::metrics::TrialRecord;
use gossipsim::policy::{self, PolicyRegistry};
use gossipsim::simulation::{DEFAULT_FANOUT, SimConfig, Simulation};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation once (the default when no subcommand is given)
    Run(RunArgs),

    /// Run every policy with the same seed
    Compare {
        #[arg(short = 'n', value_parser = positive_integer::<usize>, default_value_t = 20)]
        nodes_count: usize,
        #[arg(short = 'i', value_parser = positive_integer::<u64>, default_value_t = 1000)]
        repeats: u64,
        #[arg(long, value_parser = positive_integer::<usize>, default_value_t = DEFAULT_FANOUT)]
        fanout: usize,
        #[arg(long)]
        seed: Option<u64>,
    },

    List,
}

#[derive(Args, Clone)]
struct RunArgs {
    #[arg(short = 'n', value_parser = positive_integer::<usize>, default_value_t = 20)]
    nodes_count: usize,
    #[arg(short = 'i', value_parser = positive_integer::<u64>, default_value_t = 1000)]
    repeats: u64,
    #[arg(long)]
    advanced_algo: bool,
    #[arg(long, conflicts_with = "advanced_algo")]
    policy: Option<String>,
    #[arg(long, value_parser = positive_integer::<usize>, default_value_t = DEFAULT_FANOUT)]
    fanout: usize,
    #[arg(long)]
    seed: Option<u64>,
    /// Directory for the per-trial CSV and the JSON analysis
    #[arg(long)]
    save: Option<String>,
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Run(args)) => run_single_simulation(args)?,
        None => run_single_simulation(cli.run)?,

        Some(Commands::Compare { nodes_count, repeats, fanout, seed }) => {
            compare_policies(nodes_count, repeats, fanout, seed)?;
        }

        Some(Commands::List) => {
            println!("\nAvailable Fan-out Policies");

            for name in PolicyRegistry::global().list() {
                println!("  - {}", name);
            }

            println!("\nUsage: gossipsim run --policy <name>");
            println!("Example: gossipsim -n 50 -i 1000 --advanced-algo\n");
        }
    }

    info!("Total runtime: {:.2}s", program_start.elapsed().as_secs_f64());

    Ok(())
}

fn positive_integer<T>(raw: &str) -> Result<T, String>
where
    T: FromStr + Default + PartialEq,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(format!("{} is not a positive integer", raw)),
    }
}

fn run_single_simulation(args: RunArgs) -> Result<()> {
    let policy_name = args
        .policy
        .clone()
        .unwrap_or_else(|| policy::policy_for_flag(args.advanced_algo).to_string());

    let mut config = SimConfig::default()
        .with_nodes(args.nodes_count)
        .with_runs(args.repeats)
        .with_fanout(args.fanout)
        .with_policy(policy_name);
    config.name = format!("{}_{}n", config.policy_name, config.nodes_count);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut sim = Simulation::new(config)?;

    let pb = progress_bar(args.repeats, args.no_progress)?;
    let mut records = Vec::with_capacity(args.repeats as usize);
    sim.run_with(|record| {
        pb.inc(1);
        records.push(record.clone());
    })?;
    pb.finish_with_message("Simulation complete");

    let stats = sim.stats();
    info!("{}/{} trials reached every node", stats.successes, stats.trials);
    println!(
        "In {}% cases all nodes received the packet",
        format_percentage(stats.total_success_rate * 100.0)
    );
    println!("Total iterations count: {}", stats.total_iterations);

    if let Some(dir) = args.save {
        let report =
            analyzer::analyze(&records, sim.config(), sim.policy_name(), stats.total_iterations);
        save_results(&report, &records, &dir)?;
    }

    Ok(())
}

/// Whole numbers keep a trailing `.0` (`100.0`, not `100`).
fn format_percentage(percentage: f64) -> String {
    if percentage.is_finite() && percentage.fract() == 0.0 {
        format!("{:.1}", percentage)
    } else {
        percentage.to_string()
    }
}

fn compare_policies(
    nodes_count: usize,
    repeats: u64,
    fanout: usize,
    seed: Option<u64>,
) -> Result<()> {
    // Every policy starts from the same seed.
    let seed = seed.unwrap_or_else(rand::random);

    info!("Gossip: Comparison");
    info!("Nodes: {}, Runs: {}, Fan-out: {}, Seed: {}", nodes_count, repeats, fanout, seed);

    let mut reports = Vec::new();
    for policy_name in PolicyRegistry::global().distinct() {
        let config = SimConfig {
            name: format!("{}_{}n", policy_name, nodes_count),
            nodes_count,
            gossip_runs: repeats,
            fanout,
            policy_name: policy_name.clone(),
            seed: Some(seed),
        };

        let mut sim = match Simulation::new(config) {
            Ok(sim) => sim,
            Err(e) => {
                warn!("Skipping {}: {}", policy_name, e);
                continue;
            }
        };

        let mut records: Vec<TrialRecord> = Vec::with_capacity(repeats as usize);
        sim.run_with(|record| records.push(record.clone()))?;
        reports.push(analyzer::analyze(
            &records,
            sim.config(),
            sim.policy_name(),
            sim.total_iterations(),
        ));
    }

    if reports.is_empty() {
        anyhow::bail!("No policy could run with {} nodes and fan-out {}", nodes_count, fanout);
    }

    comparison_table(&reports);
    Ok(())
}

fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} trials {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

fn save_results(report: &AnalysisReport, records: &[TrialRecord], dir: &str) -> Result<()> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    std::fs::create_dir_all(dir)?;

    let csv_path = Path::new(dir).join(format!("{}_{}.csv", report.name, timestamp));
    let mut logger = TrialLogger::new(&csv_path)?;
    logger.log_batch(records)?;
    info!("Trials saved to: {}", csv_path.display());

    let json_path = Path::new(dir).join(format!("{}_{}_analysis.json", report.name, timestamp));
    report.save_json(&json_path)?;
    info!("Analysis saved to: {}", json_path.display());

    info!("Mean rounds per trial: {:.2}", report.mean_rounds);
    info!("Mean coverage: {:.2}%", report.mean_coverage * 100.0);

    Ok(())
}

fn comparison_table(reports: &[AnalysisReport]) {
    println!("\n╔═════════════════╦════════════╦════════════╦════════════╦════════════╗");
    println!("║ Policy          ║ Success    ║ Iterations ║ Mean       ║ Worst      ║");
    println!("║                 ║ (%)        ║ (total)    ║ rounds     ║ coverage   ║");
    println!("╠═════════════════╬════════════╬════════════╬════════════╬════════════╣");

    for report in reports {
        println!(
            "║ {:<15} ║ {:>9.2}% ║ {:>10} ║ {:>10.2} ║ {:>9.2}% ║",
            report.policy_name,
            report.success_rate * 100.0,
            report.total_iterations,
            report.mean_rounds,
            report.worst_coverage * 100.0,
        );
    }

    println!("╚═════════════════╩════════════╩════════════╩════════════╩════════════╝\n");

    if let Some(best) = reports
        .iter()
        .max_by(|a, b| a.success_rate.total_cmp(&b.success_rate))
    {
        println!("Most reliable: {} ({:.2}%)", best.policy_name, best.success_rate * 100.0);
    }
    println!();
}
