//! Transaction processing engine
//!
//! This module provides the TransactionEngine that executes requests by
//! coordinating between the LockManager and the AccountStore.
//!
//! The engine enforces the following rules:
//! - Every account id is validated before any lock is taken
//! - Balances are only read or written while their account lock is held
//! - Transfer accounts are locked one at a time in ascending id order
//! - A transfer is checked in full before any balance is written, so it is
//!   applied to every account or to none

use crate::core::lock_manager::LockManager;
use crate::core::traits::AccountStore;
use crate::types::{
    AccountId, Amount, BankError, Request, RequestId, RequestKind, ResultLine, Timestamp,
    Transfer,
};
use std::sync::Arc;

/// Outcome of the sufficiency pass over a transfer
enum TransferCheck {
    /// Every transaction can be applied; new balances in ascending account order
    Ready(Vec<(AccountId, Amount)>),

    /// The first account whose debit would overdraw it
    Insufficient(AccountId),
}

/// Request execution engine
///
/// Shared by every worker. Holds the account store and one lock per account.
pub struct TransactionEngine {
    accounts: Arc<dyn AccountStore>,
    locks: Arc<LockManager>,
}

impl TransactionEngine {
    /// Create an engine over an account store
    ///
    /// The lock manager is sized to the store's account count.
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        let locks = Arc::new(LockManager::new(accounts.account_count()));
        TransactionEngine { accounts, locks }
    }

    /// Create an engine sharing an existing lock manager
    ///
    /// Lets a caller observe or instrument the locks the workers take.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the lock manager and the store disagree on
    /// the number of accounts.
    pub fn with_locks(
        accounts: Arc<dyn AccountStore>,
        locks: Arc<LockManager>,
    ) -> Result<Self, BankError> {
        if locks.account_count() != accounts.account_count() {
            return Err(BankError::invalid_config(format!(
                "lock manager guards {} accounts, store holds {}",
                locks.account_count(),
                accounts.account_count()
            )));
        }
        Ok(TransactionEngine { accounts, locks })
    }

    /// The account store this engine mutates
    pub fn accounts(&self) -> &Arc<dyn AccountStore> {
        &self.accounts
    }

    /// The per-account locks
    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    /// Execute a single request
    ///
    /// # Returns
    ///
    /// * `Ok(Some(line))` for a balance check or transfer (including an
    ///   insufficient-funds abort)
    /// * `Ok(None)` for the shutdown sentinel, which is not a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request references an unknown account (no lock is taken)
    /// - A credit would overflow an account balance (nothing is written)
    pub fn execute(&self, request: &Request) -> Result<Option<ResultLine>, BankError> {
        match &request.kind {
            RequestKind::BalanceCheck { account } => self
                .check_balance(request.id, request.start, *account)
                .map(Some),
            RequestKind::Transfer(transfer) => self
                .transfer(request.id, request.start, transfer)
                .map(Some),
            RequestKind::Shutdown => Ok(None),
        }
    }

    /// Read one account's balance under its lock
    fn check_balance(
        &self,
        request: RequestId,
        start: Timestamp,
        account: AccountId,
    ) -> Result<ResultLine, BankError> {
        let balance = {
            let _held = self.locks.lock_all([account])?;
            self.accounts.read(account)?
        };

        tracing::debug!(request, account, balance, "balance checked");

        Ok(ResultLine::Balance {
            request,
            balance,
            start,
            end: Timestamp::now(),
        })
    }

    /// Apply a transfer to every account, or to none
    fn transfer(
        &self,
        request: RequestId,
        start: Timestamp,
        transfer: &Transfer,
    ) -> Result<ResultLine, BankError> {
        let held = self.locks.lock_all(transfer.accounts())?;

        match self.check_transfer(request, transfer)? {
            TransferCheck::Insufficient(account) => {
                drop(held);
                tracing::debug!(request, account, "transfer aborted: insufficient funds");

                Ok(ResultLine::InsufficientFunds {
                    request,
                    account,
                    start,
                    end: Timestamp::now(),
                })
            }
            TransferCheck::Ready(updates) => {
                for (account, balance) in updates {
                    self.accounts.write(account, balance)?;
                }
                drop(held);
                tracing::debug!(request, net = transfer.net_amount(), "transfer committed");

                Ok(ResultLine::Committed {
                    request,
                    start,
                    end: Timestamp::now(),
                })
            }
        }
    }

    /// Read every balance and compute the new ones without writing
    ///
    /// Caller must hold the locks of every account in the transfer.
    fn check_transfer(
        &self,
        request: RequestId,
        transfer: &Transfer,
    ) -> Result<TransferCheck, BankError> {
        let mut updates = Vec::with_capacity(transfer.transactions().len());

        for tx in transfer.transactions() {
            let balance = self.accounts.read(tx.account)?;

            match balance.checked_add(tx.amount) {
                Some(updated) if tx.amount < 0 && updated < 0 => {
                    return Ok(TransferCheck::Insufficient(tx.account));
                }
                // Underflow past i64::MIN is still an overdraft
                None if tx.amount < 0 => {
                    return Ok(TransferCheck::Insufficient(tx.account));
                }
                None => {
                    return Err(BankError::BalanceOverflow {
                        request,
                        account: tx.account,
                    });
                }
                Some(updated) => updates.push((tx.account, updated)),
            }
        }

        Ok(TransferCheck::Ready(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_store::Accounts;
    use crate::types::Transaction;
    use rstest::rstest;

    fn engine(account_count: usize, initial_balance: Amount) -> TransactionEngine {
        TransactionEngine::new(Arc::new(Accounts::new(account_count, initial_balance).unwrap()))
    }

    fn transfer(id: RequestId, pairs: &[(AccountId, Amount)]) -> Request {
        let txs = pairs
            .iter()
            .map(|&(account, amount)| Transaction::new(account, amount))
            .collect();
        Request::transfer(id, txs).unwrap()
    }

    fn balances(engine: &TransactionEngine) -> Vec<Amount> {
        engine
            .accounts()
            .snapshot()
            .iter()
            .map(|account| account.balance)
            .collect()
    }

    #[test]
    fn test_balance_check_reports_balance() {
        let engine = engine(2, 100);
        let request = Request::balance_check(1, 2);

        let line = engine.execute(&request).unwrap().unwrap();

        assert!(matches!(
            line,
            ResultLine::Balance { request: 1, balance: 100, .. }
        ));
    }

    #[test]
    fn test_balance_check_carries_request_start() {
        let engine = engine(1, 0);
        let start = Timestamp::from_parts(1_000, 5).unwrap();
        let request = Request::with_start(3, start, RequestKind::BalanceCheck { account: 1 });

        match engine.execute(&request).unwrap() {
            Some(ResultLine::Balance { start: s, end, .. }) => {
                assert_eq!(s, start);
                assert!(end > start);
            }
            other => panic!("Expected balance line, got {:?}", other),
        }
    }

    #[rstest]
    #[case::zero(0)]
    #[case::past_end(3)]
    fn test_balance_check_unknown_account(#[case] account: AccountId) {
        let engine = engine(2, 100);

        let result = engine.execute(&Request::balance_check(1, account));

        assert_eq!(result, Err(BankError::unknown_account(account, 2)));
    }

    #[test]
    fn test_transfer_commits_every_transaction() {
        let engine = engine(2, 100);

        let line = engine.execute(&transfer(1, &[(1, -40), (2, 40)])).unwrap();

        assert!(matches!(line, Some(ResultLine::Committed { request: 1, .. })));
        assert_eq!(balances(&engine), vec![60, 140]);
    }

    #[test]
    fn test_transfer_insufficient_funds_changes_nothing() {
        let engine = engine(2, 100);

        let line = engine.execute(&transfer(1, &[(1, -150), (2, 150)])).unwrap();

        assert!(matches!(
            line,
            Some(ResultLine::InsufficientFunds { request: 1, account: 1, .. })
        ));
        assert_eq!(balances(&engine), vec![100, 100]);
    }

    #[test]
    fn test_transfer_reports_first_failing_account_in_ascending_order() {
        let engine = engine(3, 10);

        let line = engine
            .execute(&transfer(1, &[(3, -20), (1, 5), (2, -20)]))
            .unwrap();

        assert!(matches!(
            line,
            Some(ResultLine::InsufficientFunds { account: 2, .. })
        ));
        assert_eq!(balances(&engine), vec![10, 10, 10]);
    }

    #[test]
    fn test_transfer_can_drain_an_account_to_zero() {
        let engine = engine(2, 100);

        engine.execute(&transfer(1, &[(1, -100), (2, 100)])).unwrap();

        assert_eq!(balances(&engine), vec![0, 200]);
    }

    #[test]
    fn test_credit_only_transfer_is_allowed() {
        let engine = engine(3, 0);

        engine.execute(&transfer(1, &[(2, 5), (3, 7)])).unwrap();

        assert_eq!(balances(&engine), vec![0, 5, 7]);
    }

    #[test]
    fn test_transfer_unknown_account_takes_no_locks_and_changes_nothing() {
        let engine = engine(2, 100);

        let result = engine.execute(&transfer(1, &[(1, -10), (5, 10)]));

        assert_eq!(result, Err(BankError::unknown_account(5, 2)));
        assert_eq!(engine.locks().holder(1), None);
        assert_eq!(balances(&engine), vec![100, 100]);
    }

    #[test]
    fn test_transfer_overflow_changes_nothing() {
        let engine = engine(2, 100);
        engine.accounts().write(2, Amount::MAX).unwrap();

        let result = engine.execute(&transfer(4, &[(1, -1), (2, 1)]));

        assert_eq!(
            result,
            Err(BankError::BalanceOverflow { request: 4, account: 2 })
        );
        assert_eq!(balances(&engine), vec![100, Amount::MAX]);
        assert_eq!(engine.locks().holder(1), None);
        assert_eq!(engine.locks().holder(2), None);
    }

    #[test]
    fn test_locks_are_released_after_every_outcome() {
        let engine = engine(2, 10);

        engine.execute(&transfer(1, &[(1, -5), (2, 5)])).unwrap();
        engine.execute(&transfer(2, &[(1, -50), (2, 50)])).unwrap();
        engine.execute(&Request::balance_check(3, 2)).unwrap();

        assert_eq!(engine.locks().holder(1), None);
        assert_eq!(engine.locks().holder(2), None);
    }

    #[test]
    fn test_with_locks_rejects_mismatched_sizes() {
        let accounts = Arc::new(Accounts::new(3, 0).unwrap());
        let result = TransactionEngine::with_locks(accounts, Arc::new(LockManager::new(2)));
        assert!(matches!(result, Err(BankError::InvalidConfig { .. })));
    }

    #[test]
    fn test_shutdown_produces_no_line() {
        let engine = engine(1, 0);
        assert_eq!(engine.execute(&Request::shutdown(1)), Ok(None));
    }

    #[test]
    fn test_check_after_transfer_sees_new_balance() {
        let engine = engine(2, 100);

        engine.execute(&transfer(1, &[(1, -40), (2, 40)])).unwrap();
        let line = engine.execute(&Request::balance_check(2, 2)).unwrap();

        assert!(matches!(
            line,
            Some(ResultLine::Balance { balance: 140, .. })
        ));
    }
}
