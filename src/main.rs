use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use vitals_vault::{IntegrityService, ScrubConfig};

/// Deduplicate, validate, scrub and store vitals records.
#[derive(Parser, Debug)]
#[command(name = "vitals-vault", version, about)]
struct Cli {
    /// TOML file with scrubber settings (window, spike_factor, zero_baseline)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report the first value that repeats an earlier one
    CheckDuplicates {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
    },
    /// Check that an identifier is a palindrome once normalized
    ValidateId { id: String },
    /// Validate and scrub one record without storing it
    Sanitize {
        id: String,
        /// Comma-separated readings, e.g. "1,2,3,2,1000"
        vitals: String,
    },
    /// Run the pipeline over one or more sources, in order, into one vault
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Look up an identifier after ingestion (repeatable)
        #[arg(long = "get")]
        get: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serializing result")?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ScrubConfig::load(path)?,
        None => ScrubConfig::default(),
    };
    let mut service = IntegrityService::new(config);

    match cli.command {
        Command::CheckDuplicates { values } => {
            println!("{}", service.check_duplicates(&values));
        }
        Command::ValidateId { id } => print_json(&service.validate_identifier(&id))?,
        Command::Sanitize { id, vitals } => print_json(&service.sanitize(&id, &vitals))?,
        Command::Ingest { paths, get } => {
            for path in &paths {
                print_json(&service.run_pipeline(path))?;
            }
            for id in &get {
                print_json(&service.retrieve(id))?;
            }
        }
    }

    Ok(())
}
