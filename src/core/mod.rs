//! Core business logic module
//!
//! This module contains the concurrent transaction processing components:
//! - `traits` - Seams to the account store and result sink
//! - `account_store` - Default account storage
//! - `lock_manager` - Per-account locks and ascending-order acquisition
//! - `request_queue` - Blocking request FIFO with drain-on-shutdown
//! - `engine` - Balance check and all-or-nothing transfer execution
//! - `worker_pool` - Worker threads draining the queue

pub mod account_store;
pub mod engine;
pub mod lock_manager;
pub mod request_queue;
pub mod traits;
pub mod worker_pool;

pub use account_store::Accounts;
pub use engine::TransactionEngine;
pub use lock_manager::{HeldAccounts, LockManager};
pub use request_queue::RequestQueue;
pub use traits::{AccountStore, ResultSink};
pub use worker_pool::{WorkerPool, WorkerStats};
