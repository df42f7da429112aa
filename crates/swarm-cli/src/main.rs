use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use swarm_core::{RunOptions, RunSummary, Scenario};
use tracing::{info, warn};

const BENCHMARK_STEPS: usize = 100;
const TARGET_SPS: f64 = 100.0;

#[derive(Parser)]
#[command(name = "swarm")]
#[command(about = "Predator/prey particle swarm simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation from a scenario file
    Run {
        /// Path to scenario file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for the run summary (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Override the number of iterations from the scenario file
        #[arg(long)]
        iterations: Option<usize>,

        /// Summarise every n-th recorded state
        #[arg(long, default_value_t = 10)]
        sample_every: usize,

        /// Include per-component urgency magnitudes in the summary
        #[arg(long)]
        urgencies: bool,
    },
    /// Run the performance benchmark suite
    Benchmark,
    /// Dump the default scenario to stdout
    DumpDefaultConfig,
}

fn load_scenario(path: &PathBuf) -> Result<Scenario> {
    let file = File::open(path).context("failed to open scenario file")?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("failed to parse scenario")
}

fn run_benchmark(particles: usize, predators: usize) -> Result<()> {
    let scenario = Scenario {
        particles,
        predators,
        iterations: BENCHMARK_STEPS,
        ..Scenario::default()
    };
    scenario
        .validate()
        .context("Benchmark scenario validation error")?;

    let mut engine = scenario.engine().context("failed to initialize engine")?;
    let start = Instant::now();
    // Record only the final state so the timing reflects stepping alone.
    let options = RunOptions {
        skip_initial_states: BENCHMARK_STEPS,
        return_urgency_vectors: false,
    };
    let result = engine.run(scenario.timestep, BENCHMARK_STEPS, options);
    let elapsed_us = start.elapsed().as_micros().max(1) as f64;

    let avg_step_us = elapsed_us / BENCHMARK_STEPS as f64;
    let steps_per_sec = 1_000_000.0 / avg_step_us;
    println!("--- {particles} particles, {predators} predators ---");
    println!("  Avg step:      {avg_step_us:.0} us ({steps_per_sec:.1} steps/sec)");
    let verdict = if steps_per_sec >= TARGET_SPS {
        "GO"
    } else {
        "NO-GO"
    };
    println!("  Verdict:       {verdict} (target: >={TARGET_SPS} steps/sec)");
    if let Some(last) = result.states.last() {
        let metrics = swarm_core::StepMetrics::from_state(0, last);
        println!("  Final spread:  {:.3}", metrics.spread_mean);
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let scenario = Scenario::default();
            println!("{}", serde_json::to_string_pretty(&scenario)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                warn!("running in debug mode; results are not representative");
            }
            println!("=== Swarm Engine Benchmark ===");
            println!("Steps: {BENCHMARK_STEPS}, Target: >={TARGET_SPS} steps/sec");
            println!();

            let configs = [(100, 2), (250, 5), (500, 10), (1000, 10)];
            for (particles, predators) in configs {
                run_benchmark(particles, predators)?;
            }
        }
        Commands::Run {
            config,
            out,
            iterations,
            sample_every,
            urgencies,
        } => {
            let mut scenario = load_scenario(&config)?;
            if let Some(iterations) = iterations {
                scenario.iterations = iterations;
            }
            scenario.validate().context("Scenario validation error")?;

            info!(path = ?config, "loaded scenario");
            println!("Simulating for {} iterations...", scenario.iterations);

            let mut engine = scenario.engine().context("failed to initialize engine")?;
            let result = engine.run(
                scenario.timestep,
                scenario.iterations,
                scenario.run_options(urgencies),
            );
            let summary = RunSummary::from_result(
                &result,
                scenario.timestep,
                scenario.iterations,
                scenario.skip_initial_states,
                sample_every,
            );

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
                println!("Run complete. Summary saved to {:?}", out_dir);
            } else {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }
    Ok(())
}
