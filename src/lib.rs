//! Bank Server Library
//! # Overview
//!
//! This library provides a concurrent transaction-processing engine for a
//! simulated bank. A pool of worker threads drains a shared request queue and
//! applies balance checks and multi-account transfers against a fixed set of
//! accounts.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Request, ResultLine, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Concurrent processing components:
//!   - [`core::lock_manager`] - One lock per account, ascending-order acquisition
//!   - [`core::request_queue`] - Blocking FIFO with drain-on-shutdown
//!   - [`core::engine`] - Balance check and all-or-nothing transfer execution
//!   - [`core::worker_pool`] - Worker threads
//!   - [`core::account_store`] - Default account storage
//! - [`io`] - Command parsing, result output, balances report
//! - [`server`] - Run lifecycle: produce, drain, join
//!
//! # Guarantees
//!
//! - **Mutual exclusion**: a balance is only read or written while its
//!   account lock is held, and no two workers hold the same lock
//! - **All-or-nothing transfers**: every debit is checked before any balance
//!   is written; an overdraft aborts the whole transfer with an `ISF` line
//! - **Deadlock freedom**: transfers are sorted by account id when built, and
//!   locks are always taken in ascending order
//! - **Drain before exit**: `END` travels through the queue, so every earlier
//!   request produces its line before the workers stop

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod server;
pub mod types;

pub use core::{AccountStore, Accounts, LockManager, RequestQueue, ResultSink, TransactionEngine};
pub use io::{write_balances_csv, CommandReader, WriterSink};
pub use server::{BankServer, EngineConfig, RunSummary};
pub use types::{
    Account, AccountId, Amount, BankError, Request, RequestId, RequestKind, ResultLine,
    Timestamp, Transaction, Transfer,
};
