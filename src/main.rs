//! Bank Server CLI
//!
//! Runs a pool of worker threads over a fixed set of accounts, reading one
//! command per line from stdin (or `--input`) and appending one result line
//! per request to the output file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- 4 10 results.txt < commands.txt
//! cargo run -- 4 10 results.txt --input commands.txt --initial-balance 1000
//! cargo run -- 4 10 results.txt --input commands.txt --balances final.csv
//! RUST_LOG=bank_server=debug cargo run -- 4 10 results.txt < commands.txt
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 255: Missing or invalid startup configuration
//! - 254: Output destination cannot be opened
//! - 1: Any other fatal error (input read failure, result write failure)

use bank_server::cli;
use bank_server::io::{write_balances_csv, CommandReader, WriterSink};
use bank_server::server::BankServer;
use bank_server::types::error::EXIT_INVALID_CONFIG;
use bank_server::types::BankError;
use clap::error::ErrorKind;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            process::exit(EXIT_INVALID_CONFIG);
        }
    };

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "bank server failed");
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings and errors)
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(args: &cli::CliArgs) -> Result<(), BankError> {
    // Configuration problems must surface before any output is created
    let server = BankServer::new(args.to_engine_config())?;

    let input = match &args.input {
        Some(path) => Some(
            CommandReader::from_path(path).map_err(|e| BankError::invalid_config(e.to_string()))?,
        ),
        None => None,
    };

    let sink = Arc::new(WriterSink::create(&args.output)?);

    match input {
        Some(commands) => server.run(commands, sink)?,
        None => server.run(CommandReader::new(io::stdin().lock()), sink)?,
    };

    if let Some(path) = &args.balances {
        let file = File::create(path).map_err(|e| BankError::output_unavailable(path, &e))?;
        let mut writer = BufWriter::new(file);
        write_balances_csv(&server.accounts().snapshot(), &mut writer)?;
    }

    Ok(())
}
