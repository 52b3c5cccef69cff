//! Per-account lock registry
//!
//! This module provides the `LockManager`, which owns one exclusive lock per
//! account. Workers acquire the locks of every account a request touches
//! before reading or writing balances, and release them afterwards.
//!
//! # Design
//!
//! Each lock records which thread holds it. `acquire` parks the caller on a
//! condition variable until the holder calls `release`, so waiting workers
//! are descheduled rather than spinning. Ids are validated before any lock is
//! touched.
//!
//! # Deadlock Avoidance
//!
//! [`LockManager::lock_all`] acquires a set of accounts one at a time in
//! ascending id order. As long as every multi-account acquisition goes
//! through it, no cycle of waiting workers can form.

use crate::types::{AccountId, BankError};
use parking_lot::{Condvar, Mutex};
use std::thread::{self, ThreadId};

/// One account's lock
#[derive(Debug, Default)]
struct AccountLock {
    /// Thread currently holding the account, if any
    holder: Mutex<Option<ThreadId>>,

    /// Signalled whenever the account is released
    released: Condvar,
}

/// Registry of per-account locks, sized at startup
#[derive(Debug)]
pub struct LockManager {
    /// `locks[id - 1]` guards account `id`
    locks: Vec<AccountLock>,
}

impl LockManager {
    /// Create one lock per account in `1..=account_count`
    pub fn new(account_count: usize) -> Self {
        let locks = (0..account_count).map(|_| AccountLock::default()).collect();
        Self { locks }
    }

    /// Like [`LockManager::new`], but reports allocation failure
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the lock table cannot be allocated.
    pub fn try_new(account_count: usize) -> Result<Self, BankError> {
        let mut locks = Vec::new();
        locks.try_reserve_exact(account_count).map_err(|e| {
            BankError::invalid_config(format!(
                "cannot allocate locks for {} accounts: {}",
                account_count, e
            ))
        })?;
        locks.extend((0..account_count).map(|_| AccountLock::default()));
        Ok(Self { locks })
    }

    /// Number of accounts this manager guards
    pub fn account_count(&self) -> usize {
        self.locks.len()
    }

    /// Check that an id refers to an existing account
    pub fn validate(&self, account: AccountId) -> Result<(), BankError> {
        self.slot(account).map(|_| ())
    }

    fn slot(&self, account: AccountId) -> Result<&AccountLock, BankError> {
        (account as usize)
            .checked_sub(1)
            .and_then(|index| self.locks.get(index))
            .ok_or_else(|| BankError::unknown_account(account, self.locks.len()))
    }

    /// Block until the calling thread holds `account`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account id is out of range (no lock is touched)
    /// - The calling thread already holds the account
    pub fn acquire(&self, account: AccountId) -> Result<(), BankError> {
        let lock = self.slot(account)?;
        let me = thread::current().id();

        let mut holder = lock.holder.lock();
        loop {
            match *holder {
                None => {
                    *holder = Some(me);
                    return Ok(());
                }
                Some(owner) if owner == me => {
                    return Err(BankError::RecursiveLock { account });
                }
                Some(_) => lock.released.wait(&mut holder),
            }
        }
    }

    /// Release `account` and wake one waiter
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range or the calling thread does
    /// not hold the account.
    pub fn release(&self, account: AccountId) -> Result<(), BankError> {
        let lock = self.slot(account)?;
        let me = thread::current().id();

        {
            let mut holder = lock.holder.lock();
            if *holder != Some(me) {
                return Err(BankError::LockNotHeld { account });
            }
            *holder = None;
        }

        lock.released.notify_one();
        Ok(())
    }

    /// Thread currently holding `account`
    ///
    /// Returns `None` for free or unknown accounts.
    pub fn holder(&self, account: AccountId) -> Option<ThreadId> {
        self.slot(account).ok().and_then(|lock| *lock.holder.lock())
    }

    /// Acquire every listed account in ascending id order
    ///
    /// All ids are validated before the first lock is taken. Repeated ids are
    /// locked once. The returned guard releases every lock when dropped; if
    /// an acquisition fails midway, the locks already taken are released.
    pub fn lock_all<I>(&self, accounts: I) -> Result<HeldAccounts<'_>, BankError>
    where
        I: IntoIterator<Item = AccountId>,
    {
        let mut ids: Vec<AccountId> = accounts.into_iter().collect();
        for &id in &ids {
            self.validate(id)?;
        }
        ids.sort_unstable();
        ids.dedup();

        let mut held = HeldAccounts {
            manager: self,
            accounts: Vec::with_capacity(ids.len()),
        };
        for id in ids {
            self.acquire(id)?;
            held.accounts.push(id);
        }

        Ok(held)
    }
}

/// Scoped set of account locks held by the current thread
///
/// Released on drop. Must be dropped on the thread that created it.
#[derive(Debug)]
pub struct HeldAccounts<'a> {
    manager: &'a LockManager,
    accounts: Vec<AccountId>,
}

impl HeldAccounts<'_> {
    /// Accounts held, in the order they were acquired
    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }
}

impl Drop for HeldAccounts<'_> {
    fn drop(&mut self) {
        for &account in self.accounts.iter().rev() {
            if let Err(e) = self.manager.release(account) {
                tracing::error!(account, error = %e, "failed to release account lock");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn test_try_new_sizes_lock_table() {
        let manager = LockManager::try_new(4).unwrap();

        assert_eq!(manager.account_count(), 4);
        assert!(manager.validate(4).is_ok());
        assert!(manager.validate(5).is_err());
    }

    #[test]
    fn test_try_new_reports_impossible_allocation() {
        let result = LockManager::try_new(usize::MAX);

        assert!(matches!(result, Err(BankError::InvalidConfig { .. })));
    }

    #[test]
    fn test_acquire_and_release_marks_holder() {
        let manager = LockManager::new(3);

        manager.acquire(2).unwrap();
        assert_eq!(manager.holder(2), Some(thread::current().id()));
        assert_eq!(manager.holder(1), None);

        manager.release(2).unwrap();
        assert_eq!(manager.holder(2), None);
    }

    #[rstest]
    #[case::zero(0)]
    #[case::past_end(4)]
    #[case::far_past_end(u32::MAX)]
    fn test_unknown_accounts_are_rejected(#[case] account: AccountId) {
        let manager = LockManager::new(3);

        assert_eq!(
            manager.acquire(account),
            Err(BankError::unknown_account(account, 3))
        );
        assert_eq!(
            manager.release(account),
            Err(BankError::unknown_account(account, 3))
        );
        assert_eq!(manager.holder(account), None);
    }

    #[test]
    fn test_recursive_acquire_is_rejected() {
        let manager = LockManager::new(1);

        manager.acquire(1).unwrap();
        assert_eq!(
            manager.acquire(1),
            Err(BankError::RecursiveLock { account: 1 })
        );
        manager.release(1).unwrap();
    }

    #[test]
    fn test_release_without_holding_is_rejected() {
        let manager = LockManager::new(1);
        assert_eq!(manager.release(1), Err(BankError::LockNotHeld { account: 1 }));
    }

    #[test]
    fn test_release_from_other_thread_is_rejected() {
        let manager = Arc::new(LockManager::new(1));
        manager.acquire(1).unwrap();

        let other = Arc::clone(&manager);
        let result = thread::spawn(move || other.release(1)).join().unwrap();

        assert_eq!(result, Err(BankError::LockNotHeld { account: 1 }));
        manager.release(1).unwrap();
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let manager = Arc::new(LockManager::new(1));
        manager.acquire(1).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                manager.acquire(1).unwrap();
                tx.send(()).unwrap();
                manager.release(1).unwrap();
            })
        };

        // The waiter cannot get in while we hold the lock
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        manager.release(1).unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
    }

    #[test]
    fn test_no_two_threads_inside_the_same_account() {
        let manager = Arc::new(LockManager::new(2));
        let inside = Arc::new(AtomicUsize::new(0));
        let entries = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let inside = Arc::clone(&inside);
                let entries = Arc::clone(&entries);
                thread::spawn(move || {
                    for _ in 0..500 {
                        manager.acquire(1).unwrap();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        entries.fetch_add(1, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                        manager.release(1).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(entries.load(Ordering::SeqCst), 8 * 500);
    }

    #[test]
    fn test_lock_all_acquires_ascending_and_releases_on_drop() {
        let manager = LockManager::new(5);

        {
            let held = manager.lock_all([4, 1, 3]).unwrap();
            assert_eq!(held.accounts(), &[1, 3, 4]);
            assert!(manager.holder(1).is_some());
            assert!(manager.holder(3).is_some());
            assert!(manager.holder(4).is_some());
            assert!(manager.holder(2).is_none());
        }

        for id in 1..=5 {
            assert_eq!(manager.holder(id), None);
        }
    }

    #[test]
    fn test_lock_all_locks_repeated_ids_once() {
        let manager = LockManager::new(3);
        let held = manager.lock_all([2, 2, 1]).unwrap();
        assert_eq!(held.accounts(), &[1, 2]);
    }

    #[test]
    fn test_lock_all_with_unknown_id_takes_no_locks() {
        let manager = LockManager::new(3);

        let result = manager.lock_all([1, 9, 2]);

        assert_eq!(result.err(), Some(BankError::unknown_account(9, 3)));
        assert_eq!(manager.holder(1), None);
        assert_eq!(manager.holder(2), None);
    }

    #[test]
    fn test_opposite_order_requests_do_not_deadlock() {
        let manager = Arc::new(LockManager::new(2));

        let handles: Vec<_> = [[1, 2], [2, 1]]
            .into_iter()
            .map(|order| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let _held = manager.lock_all(order).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
