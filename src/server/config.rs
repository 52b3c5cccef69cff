//! Startup configuration for the engine

use crate::types::{Amount, BankError, MAX_ACCOUNTS};

/// Largest worker pool the server will start
pub const MAX_WORKERS: usize = 1024;

/// Engine configuration
///
/// Controls the number of worker threads, how many accounts exist, and the
/// balance every account starts with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Number of accounts, addressed as `1..=accounts`
    pub accounts: usize,
    /// Starting balance of every account
    pub initial_balance: Amount,
}

impl EngineConfig {
    /// Configuration for `accounts` accounts with one worker per CPU core
    pub fn new(accounts: usize) -> Self {
        Self {
            workers: num_cpus::get(),
            accounts,
            initial_balance: 0,
        }
    }

    /// Set the number of worker threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the starting balance of every account
    pub fn with_initial_balance(mut self, initial_balance: Amount) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    /// Reject configurations the server cannot start with
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if:
    /// - `workers` is zero or above [`MAX_WORKERS`]
    /// - `accounts` is zero or above [`MAX_ACCOUNTS`]
    /// - `initial_balance` is negative
    pub fn validate(&self) -> Result<(), BankError> {
        if self.workers == 0 {
            return Err(BankError::invalid_config("worker count must be at least 1"));
        }
        if self.workers > MAX_WORKERS {
            return Err(BankError::invalid_config(format!(
                "worker count {} exceeds the maximum of {}",
                self.workers, MAX_WORKERS
            )));
        }
        if self.accounts == 0 {
            return Err(BankError::invalid_config("account count must be at least 1"));
        }
        if self.accounts > MAX_ACCOUNTS {
            return Err(BankError::invalid_config(format!(
                "account count {} exceeds the maximum of {}",
                self.accounts, MAX_ACCOUNTS
            )));
        }
        if self.initial_balance < 0 {
            return Err(BankError::invalid_config(format!(
                "initial balance {} must not be negative",
                self.initial_balance
            )));
        }
        Ok(())
    }
}
