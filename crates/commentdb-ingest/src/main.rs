//! commentdb Ingest - offline CSV checker

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commentdb_common::logging::{init_logging, LogConfig, LogLevel};
use commentdb_ingest::{CsvIngestor, IngestError, IngestReport};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "commentdb-ingest")]
#[command(author, version, about = "Validate comment CSV files without touching the database")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a CSV file, then print a summary
    Check {
        /// CSV file to check
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("commentdb-ingest")
        .build();
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The checker still works without a subscriber.
    let _ = init_logging(&log_config);

    if let Err(e) = run(cli.command) {
        error!(error = %e, "Check failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Check { file, json } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let ingestor = CsvIngestor::new()?;
            let result = match ingestor.ingest(&bytes) {
                Ok(result) => result,
                Err(e @ IngestError::MissingHeaders(_)) => {
                    return Err(e).with_context(|| format!("{} is not a comment CSV", file.display()))
                },
                Err(e) => return Err(e.into()),
            };

            let report = IngestReport::from_parse(&result);
            info!(
                file = %file.display(),
                total_rows = report.total_rows,
                failed_rows = report.failed_rows,
                "File checked"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
            Ok(())
        },
    }
}
