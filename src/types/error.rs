//! Error types for the bank server
//!
//! This module defines all error types that can occur while starting the
//! server, reading commands, and executing requests.
//!
//! # Error Categories
//!
//! - **Startup Errors**: Invalid configuration, unopenable output destination
//! - **Input Errors**: Malformed command lines (the line is skipped)
//! - **Request Errors**: Unknown accounts, lock misuse, balance overflow (the
//!   request is dropped and processing continues)
//! - **Runtime Errors**: I/O failures on the result sink, worker panics
//!
//! Insufficient funds is not an error: it is a normal request outcome that
//! produces an `ISF` result line.

use crate::types::{AccountId, RequestId};
use thiserror::Error;

/// Process exit code for missing or invalid startup configuration
pub const EXIT_INVALID_CONFIG: i32 = 255;

/// Process exit code when the output destination cannot be opened
pub const EXIT_OUTPUT_UNAVAILABLE: i32 = 254;

/// Process exit code for any other fatal runtime failure
pub const EXIT_RUNTIME_FAILURE: i32 = 1;

/// Main error type for the bank server
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// A request referenced an account outside `1..=account_count`
    ///
    /// Fatal to that request only. No lock is taken for the id.
    #[error("Unknown account {account} (valid range 1..={account_count})")]
    UnknownAccount {
        /// The offending account id
        account: AccountId,
        /// Number of accounts configured at startup
        account_count: usize,
    },

    /// A thread tried to acquire an account lock it already holds
    #[error("Account {account} is already locked by the current worker")]
    RecursiveLock {
        /// Account id
        account: AccountId,
    },

    /// A thread tried to release an account lock it does not hold
    #[error("Account {account} is not locked by the current worker")]
    LockNotHeld {
        /// Account id
        account: AccountId,
    },

    /// Applying a transfer would overflow an account balance
    ///
    /// The whole transfer is dropped without mutating any balance.
    #[error("Balance overflow on account {account} in request {request}")]
    BalanceOverflow {
        /// Request id
        request: RequestId,
        /// Account whose balance would overflow
        account: AccountId,
    },

    /// A transfer listed the same account twice
    #[error("Account {account} appears more than once in a transfer")]
    DuplicateAccount {
        /// The repeated account id
        account: AccountId,
    },

    /// A transfer carried no transactions
    #[error("Transfer requires at least one transaction")]
    EmptyTransfer,

    /// A request was pushed after the shutdown sentinel
    #[error("Request queue is closed")]
    QueueClosed,

    /// A command line could not be parsed
    ///
    /// Recoverable: the line is skipped and reading continues.
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Input line number (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Startup configuration is missing or invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// The output destination could not be opened
    #[error("Cannot open output '{path}': {message}")]
    OutputUnavailable {
        /// The output path
        path: String,
        /// Underlying I/O error description
        message: String,
    },

    /// I/O error while reading input or writing results
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// A worker thread panicked
    #[error("Worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker in the pool
        worker: usize,
    },
}

impl From<std::io::Error> for BankError {
    fn from(error: std::io::Error) -> Self {
        BankError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for BankError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        BankError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl BankError {
    /// Create an UnknownAccount error
    pub fn unknown_account(account: AccountId, account_count: usize) -> Self {
        BankError::UnknownAccount {
            account,
            account_count,
        }
    }

    /// Create a ParseError error
    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        BankError::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        BankError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an OutputUnavailable error
    pub fn output_unavailable(path: &std::path::Path, error: &std::io::Error) -> Self {
        BankError::OutputUnavailable {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    /// Whether this error only affects a single request
    ///
    /// Request-scoped errors are logged and counted; everything else stops
    /// the run.
    pub fn is_request_scoped(&self) -> bool {
        matches!(
            self,
            BankError::UnknownAccount { .. }
                | BankError::RecursiveLock { .. }
                | BankError::LockNotHeld { .. }
                | BankError::BalanceOverflow { .. }
        )
    }

    /// Process exit code for this error when it ends the run
    pub fn exit_code(&self) -> i32 {
        match self {
            BankError::InvalidConfig { .. } => EXIT_INVALID_CONFIG,
            BankError::OutputUnavailable { .. } => EXIT_OUTPUT_UNAVAILABLE,
            _ => EXIT_RUNTIME_FAILURE,
        }
    }
}
