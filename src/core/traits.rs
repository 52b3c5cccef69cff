//! Core traits for account storage and result output
//!
//! These are the seams between the transaction engine and its collaborators.
//! The engine never serializes access to the store itself; callers must hold
//! the account's lock from the [`LockManager`](crate::core::LockManager)
//! around every read-modify-write sequence.

use crate::types::{Account, AccountId, Amount, BankError, ResultLine};

/// Trait for storing account balances
///
/// Implementations only need to make a single `read` or `write` safe to call
/// concurrently; multi-step consistency comes from the lock manager.
pub trait AccountStore: Send + Sync {
    /// Number of accounts, addressed as `1..=account_count`
    fn account_count(&self) -> usize;

    /// Read an account's balance
    fn read(&self, account: AccountId) -> Result<Amount, BankError>;

    /// Overwrite an account's balance
    fn write(&self, account: AccountId, balance: Amount) -> Result<(), BankError>;

    /// All accounts in ascending id order
    fn snapshot(&self) -> Vec<Account>;

    /// Sum of all balances
    fn total_balance(&self) -> i128 {
        self.snapshot()
            .iter()
            .map(|account| i128::from(account.balance))
            .sum()
    }
}

/// Trait for the append-only result destination
///
/// A single `emit` call must write its whole line before any other caller's
/// line starts.
pub trait ResultSink: Send + Sync {
    /// Append one result line
    fn emit(&self, line: &ResultLine) -> Result<(), BankError>;
}
