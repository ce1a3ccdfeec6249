//! Command-line front end: run a full match or the training drill
//! and stream the coordinator's reports to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fm_core::PitchConfig;
use fm_sim::{run_drill, DrillConfig, MatchRunner};

#[derive(Parser)]
#[command(name = "fm_sim")]
#[command(about = "Lock-step distributed football match simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a full two-team match
    #[command(name = "match")]
    Match {
        /// Base seed for every agent's random source
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Rounds per half (default: the full 2700)
        #[arg(long)]
        rounds_per_half: Option<u32>,

        /// Suppress per-round reports, print only the final score
        #[arg(long, default_value = "false")]
        quiet: bool,
    },

    /// Run the single-squad training drill
    Training {
        /// Base seed for every agent's random source
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of drill rounds
        #[arg(long, default_value = "900")]
        rounds: u32,

        /// Suppress per-round reports
        #[arg(long, default_value = "false")]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Match { seed, rounds_per_half, quiet } => {
            let mut cfg = PitchConfig::default();
            if let Some(rounds) = rounds_per_half {
                cfg.rounds_per_half = rounds;
            }
            let summary = MatchRunner::new(cfg, seed)?.run()?;
            if !quiet {
                for report in &summary.reports {
                    print!("{}", report);
                }
            }
            println!("Final score: {} - {}", summary.score[0], summary.score[1]);
        }
        Commands::Training { seed, rounds, quiet } => {
            let cfg = DrillConfig { rounds, ..Default::default() };
            let reports = run_drill(&cfg, seed)?;
            if !quiet {
                for report in &reports {
                    print!("{}", report);
                }
            }
        }
    }
    Ok(())
}
