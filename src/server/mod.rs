//! Server module
//!
//! Wires the collaborators to the core: reads commands, feeds the request
//! queue from the calling thread, runs the worker pool, and waits for the
//! queue to drain.
//!
//! # Architecture
//!
//! ```text
//! BankServer
//!     ├── EngineConfig (workers, accounts, initial_balance)
//!     ├── Arc<dyn AccountStore>
//!     └── run(CommandReader, Arc<dyn ResultSink>)
//!         ├── RequestQueue       (producer: calling thread)
//!         ├── TransactionEngine  (locks + store)
//!         └── WorkerPool         (consumers)
//! ```

pub mod bank_server;
pub mod config;

pub use bank_server::{BankServer, RunSummary};
pub use config::{EngineConfig, MAX_WORKERS};
