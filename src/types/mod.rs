//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers and balances
//! - `request`: Requests, transfers and their canonical ordering
//! - `result_line`: Result lines emitted for completed requests
//! - `timestamp`: Wall-clock capture for request timing
//! - `error`: Error types for the bank server

pub mod account;
pub mod error;
pub mod request;
pub mod result_line;
pub mod timestamp;

pub use account::{Account, AccountId, Amount, MAX_ACCOUNTS};
pub use error::BankError;
pub use request::{Request, RequestId, RequestIds, RequestKind, Transaction, Transfer};
pub use result_line::ResultLine;
pub use timestamp::Timestamp;
