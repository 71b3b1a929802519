//! Cohort room simulator.
//!
//! # Usage
//!
//! ```bash
//! # Classic run: 20 actors, 100 rounds each, capacity 3
//! cohort-sim
//!
//! # Reproduce a run and compare the credit strategy
//! cohort-sim --seed 42 --strategy credit
//!
//! # Machine-readable report
//! cohort-sim --actors 50 --capacity 5 --format json
//! ```

use std::io::{self, Write};

use clap::{Parser, ValueEnum};
use cohort_core::{DEFAULT_CAPACITY, DEFAULT_FAIRNESS_THRESHOLD, RoomConfig};
use cohort_harness::{
    DEFAULT_ACTORS, DEFAULT_ITERATIONS, Simulation, SimulationConfig, SimulationError, Strategy,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Wake strategy selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Broadcast and re-check (bounded starvation)
    Monitor,
    /// Waker admits on the waiter's behalf (no streak bound)
    Credit,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Monitor => Self::Monitor,
            StrategyArg::Credit => Self::Credit,
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Human-readable histograms
    Text,
    /// One JSON document
    Json,
}

/// Two-category bounded room simulator
#[derive(Parser, Debug)]
#[command(name = "cohort-sim")]
#[command(about = "Simulate actors sharing a single-category room")]
#[command(version)]
struct Args {
    /// Maximum simultaneous occupants
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Same-category admissions allowed while the other category waits
    #[arg(short, long, default_value_t = DEFAULT_FAIRNESS_THRESHOLD)]
    fairness_threshold: usize,

    /// Number of actor threads
    #[arg(short, long, default_value_t = DEFAULT_ACTORS)]
    actors: usize,

    /// Enter/leave rounds per actor
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Category seed (drawn and logged when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Scheduler yields between steps (defaults to the number of actors)
    #[arg(long)]
    yields: Option<usize>,

    /// Wake strategy
    #[arg(long, value_enum, default_value = "monitor")]
    strategy: StrategyArg,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let report = match simulation_config(&args).and_then(|config| Simulation::new(config).run()) {
        Ok(report) => report,
        Err(err) => {
            if err.is_configuration() {
                tracing::error!(%err, "rejected configuration");
            } else {
                tracing::error!(%err, "simulation failed");
            }
            return Err(err.into());
        },
    };

    if report.violations > 0 {
        tracing::error!(violations = report.violations, "room admitted a forbidden occupant");
    }

    let mut out = io::stdout().lock();
    match args.format {
        Format::Text => write!(out, "{report}")?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        },
    }
    out.flush()?;

    Ok(())
}

fn simulation_config(args: &Args) -> Result<SimulationConfig, SimulationError> {
    Ok(SimulationConfig {
        room: RoomConfig::new(args.capacity, args.fairness_threshold)?,
        actors: args.actors,
        iterations: args.iterations,
        seed: args.seed,
        strategy: args.strategy.into(),
        yields: args.yields,
    })
}
