//! Salou CLI binary.
//!
//! Provides command-line interface for the salou quality backtester.

mod cmd;
mod data;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::backtest::{BacktestArgs, run_backtest};
use cmd::metrics::list_metrics;
use cmd::windows::show_windows;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "salou")]
#[command(about = "Quarterly quality-factor quintile backtester", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format (pretty or json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quintile backtest
    Backtest(BacktestArgs),

    /// List available quality metrics
    Metrics {
        /// Show numerator, denominator and description
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the rebalance schedule of a fundamentals file
    Windows {
        /// Fundamentals table (tab separated)
        #[arg(short, long)]
        fundamentals: PathBuf,

        /// Months between report date and holding period
        #[arg(short, long, default_value = "0")]
        buffer: u32,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Backtest(args) => {
            run_backtest(args).await?;
        }
        Commands::Metrics { verbose } => {
            list_metrics(verbose);
        }
        Commands::Windows {
            fundamentals,
            buffer,
        } => {
            show_windows(&fundamentals, buffer)?;
        }
    }

    Ok(())
}
