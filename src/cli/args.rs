use crate::server::EngineConfig;
use crate::types::Amount;
use clap::Parser;
use std::path::PathBuf;

/// Run a concurrent bank transaction server over commands from stdin or a file
#[derive(Parser, Debug)]
#[command(name = "bank-server")]
#[command(about = "Process bank balance checks and transfers with a pool of worker threads", long_about = None)]
pub struct CliArgs {
    /// Number of worker threads
    #[arg(value_name = "WORKERS", help = "Number of worker threads (at least 1)")]
    pub workers: usize,

    /// Number of accounts to initialize
    #[arg(value_name = "ACCOUNTS", help = "Number of accounts, addressed as 1..=ACCOUNTS")]
    pub accounts: usize,

    /// Destination for result lines
    #[arg(value_name = "OUTPUT", help = "Path of the result file (created or truncated)")]
    pub output: PathBuf,

    /// Command file to read instead of stdin
    #[arg(long = "input", value_name = "PATH", help = "Read commands from PATH instead of stdin")]
    pub input: Option<PathBuf>,

    /// Starting balance of every account
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Starting balance of every account (default: 0)"
    )]
    pub initial_balance: Amount,

    /// Where to write final balances
    #[arg(
        long = "balances",
        value_name = "PATH",
        help = "Write final account balances as CSV to PATH after shutdown"
    )]
    pub balances: Option<PathBuf>,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    ///
    /// The result is not validated here; `BankServer::new` does that.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.accounts)
            .with_workers(self.workers)
            .with_initial_balance(self.initial_balance)
    }
}
