//! Request types for the bank server
//!
//! A request is the unit of work flowing through the queue: a balance check,
//! a multi-account transfer, or the shutdown sentinel. Every request carries
//! its id and the wall-clock time it arrived.
//!
//! # Canonical Transfer Order
//!
//! `Transfer` can only be built through [`Transfer::new`], which sorts its
//! transactions ascending by account id and rejects repeated accounts. Workers
//! therefore always lock the accounts of a transfer in ascending order, so no
//! two workers can wait on each other in a cycle.

use super::{AccountId, Amount, BankError, Timestamp};

/// Request identifier
///
/// Assigned in arrival order starting at 1.
pub type RequestId = u64;

/// One account adjustment inside a transfer
///
/// Positive amounts credit the account, negative amounts debit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    /// Account to adjust
    pub account: AccountId,

    /// Signed amount to apply
    pub amount: Amount,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(account: AccountId, amount: Amount) -> Self {
        Transaction { account, amount }
    }
}

/// A multi-account transfer in canonical order
///
/// Invariants upheld by construction:
/// - at least one transaction
/// - transactions sorted ascending by account id
/// - no account id appears twice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    transactions: Vec<Transaction>,
}

impl Transfer {
    /// Canonicalize a list of transactions into a transfer
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The list is empty
    /// - The same account appears more than once
    pub fn new(mut transactions: Vec<Transaction>) -> Result<Self, BankError> {
        if transactions.is_empty() {
            return Err(BankError::EmptyTransfer);
        }

        // Stable sort keeps the submitted order of equal ids for the error below
        transactions.sort_by_key(|tx| tx.account);

        if let Some(pair) = transactions
            .windows(2)
            .find(|pair| pair[0].account == pair[1].account)
        {
            return Err(BankError::DuplicateAccount {
                account: pair[0].account,
            });
        }

        Ok(Transfer { transactions })
    }

    /// Transactions in ascending account order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Account ids in ascending order
    pub fn accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.transactions.iter().map(|tx| tx.account)
    }

    /// Net change this transfer applies across all accounts when committed
    pub fn net_amount(&self) -> i128 {
        self.transactions
            .iter()
            .map(|tx| i128::from(tx.amount))
            .sum()
    }
}

/// The operation a request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Read a single account's balance
    BalanceCheck {
        /// Account to read
        account: AccountId,
    },

    /// Apply every transaction of a transfer, or none of them
    Transfer(Transfer),

    /// No more input will arrive
    ///
    /// Travels through the queue behind all earlier requests.
    Shutdown,
}

/// A unit of work with identity and arrival time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Monotonic request id
    pub id: RequestId,

    /// Wall-clock arrival time
    pub start: Timestamp,

    /// What to do
    pub kind: RequestKind,
}

impl Request {
    /// Create a request stamped with the current time
    pub fn new(id: RequestId, kind: RequestKind) -> Self {
        Self::with_start(id, Timestamp::now(), kind)
    }

    /// Create a request with an explicit arrival time
    pub fn with_start(id: RequestId, start: Timestamp, kind: RequestKind) -> Self {
        Request { id, start, kind }
    }

    /// Create a balance check request
    pub fn balance_check(id: RequestId, account: AccountId) -> Self {
        Self::new(id, RequestKind::BalanceCheck { account })
    }

    /// Create a transfer request, canonicalizing the transactions
    pub fn transfer(id: RequestId, transactions: Vec<Transaction>) -> Result<Self, BankError> {
        Ok(Self::new(id, RequestKind::Transfer(Transfer::new(transactions)?)))
    }

    /// Create the shutdown sentinel
    pub fn shutdown(id: RequestId) -> Self {
        Self::new(id, RequestKind::Shutdown)
    }

    /// Whether this request is the shutdown sentinel
    pub fn is_shutdown(&self) -> bool {
        matches!(self.kind, RequestKind::Shutdown)
    }
}

/// Hands out request ids in arrival order
///
/// Owned by the single producer; the first id is 1.
#[derive(Debug)]
pub struct RequestIds {
    next: RequestId,
}

impl RequestIds {
    /// Start a new sequence at 1
    pub fn new() -> Self {
        RequestIds { next: 1 }
    }

    /// Take the next id
    pub fn next_id(&mut self) -> RequestId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will return
    pub fn peek(&self) -> RequestId {
        self.next
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}
