mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::compare::CompareArgs;
use commands::returns::ReturnsArgs;

/// Compare an ETF against its reference index and blended portfolios
#[derive(Parser)]
#[command(
    name = "etfcmp",
    version,
    about = "Compare an ETF against its reference index and blended portfolios",
    long_about = "Converts daily closes into month-end returns, aligns the ETF and its \
                  index on common months, and compounds the ETF, the index, a fixed \
                  ETF/index blend and a linear glide-path blend from a base of 100. \
                  Reports monthly tracking difference, win rate and the final outcome."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "csv", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an ETF with its index, a fixed blend and a glide-path blend
    Compare(CompareArgs),
    /// Month-end closes and monthly returns for a single symbol
    Returns(ReturnsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Log to stderr so that stdout carries only the report.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("etf_compare_core=debug,etf_compare_cli=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("etf_compare_core=warn,etf_compare_cli=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Returns(args) => commands::returns::run_returns(args),
        Commands::Version => {
            println!("etfcmp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
