mod plan;
mod stats;

use clap::{Parser, Subcommand};
use pixelveil::params::DEFAULT_CHANNEL;
use plan::plan_file;
use stats::{run as run_stats, StatsOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "steganalyst")]
#[command(about = "LSB steganalysis and embed planning for pixelveil carriers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dashboard of LSB statistics for every channel
    Stats {
        /// Image to analyze
        image: PathBuf,

        /// Channel used for the fused verdict
        #[arg(long)]
        channel: Option<usize>,

        /// JSON detector configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show how a payload fits a carrier at each density
    Plan {
        /// Carrier image
        image: PathBuf,

        /// Payload file
        payload: PathBuf,

        #[arg(long, default_value_t = DEFAULT_CHANNEL)]
        channel: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Stats {
            image,
            channel,
            config,
        } => {
            let options = StatsOptions { channel, config };
            let report = run_stats(&image, &options)?;
            print!("{}", report);
        }
        Commands::Plan {
            image,
            payload,
            channel,
        } => {
            let report = plan_file(&image, &payload, channel)?;
            print!("{}", report);
        }
    }

    Ok(())
}
