//! Account storage
//!
//! This module provides the `Accounts` struct, the default [`AccountStore`]
//! used by the server. Balances live in a `DashMap`, so individual reads and
//! writes are safe from any thread. Read-modify-write sequences are
//! serialized by the lock manager, not by the map.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, Amount, BankError, MAX_ACCOUNTS};
use dashmap::DashMap;

/// Fixed set of accounts `1..=account_count`
#[derive(Debug)]
pub struct Accounts {
    /// Account states keyed by id
    accounts: DashMap<AccountId, Account>,

    /// Number of accounts created at startup
    account_count: usize,
}

impl Accounts {
    /// Create `account_count` accounts, each starting at `initial_balance`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `account_count` exceeds [`MAX_ACCOUNTS`].
    pub fn new(account_count: usize, initial_balance: Amount) -> Result<Self, BankError> {
        let last = AccountId::try_from(account_count)
            .ok()
            .filter(|_| account_count <= MAX_ACCOUNTS)
            .ok_or_else(|| {
                BankError::invalid_config(format!(
                    "account count {} exceeds the maximum of {}",
                    account_count, MAX_ACCOUNTS
                ))
            })?;

        let accounts = DashMap::with_capacity(account_count);
        for id in 1..=last {
            accounts.insert(id, Account::new(id, initial_balance));
        }

        Ok(Self {
            accounts,
            account_count,
        })
    }
}

impl AccountStore for Accounts {
    fn account_count(&self) -> usize {
        self.account_count
    }

    fn read(&self, account: AccountId) -> Result<Amount, BankError> {
        self.accounts
            .get(&account)
            .map(|entry| entry.balance)
            .ok_or_else(|| BankError::unknown_account(account, self.account_count))
    }

    fn write(&self, account: AccountId, balance: Amount) -> Result<(), BankError> {
        let mut entry = self
            .accounts
            .get_mut(&account)
            .ok_or_else(|| BankError::unknown_account(account, self.account_count))?;
        entry.balance = balance;
        Ok(())
    }

    fn snapshot(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|entry| *entry.value()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }
}
