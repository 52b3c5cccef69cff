//! Account-related types for the bank server
//!
//! This module defines the Account structure and the identifiers used to
//! address accounts in requests.

use serde::Serialize;

/// Account identifier
///
/// Valid ids are in `1..=account_count`; validation happens in the lock manager
/// and account store, not here.
pub type AccountId = u32;

/// Signed balance or transfer amount
pub type Amount = i64;

/// Largest number of accounts a server will create
///
/// Every account costs a map entry and a lock, all allocated at startup.
pub const MAX_ACCOUNTS: usize = 10_000_000;

/// A single bank account
///
/// Serialized as one row of the final balances report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Account {
    /// The account id
    #[serde(rename = "account")]
    pub id: AccountId,

    /// Current balance
    ///
    /// Only written by a worker holding this account's lock.
    pub balance: Amount,
}

impl Account {
    /// Create a new account with the given starting balance
    pub fn new(id: AccountId, balance: Amount) -> Self {
        Account { id, balance }
    }
}
