//! Result lines written to the output sink
//!
//! Each completed or aborted request produces exactly one line:
//!
//! ```text
//! <request_id> BAL <balance> TIME <start> <end>
//! <request_id> OK TIME <start> <end>
//! <request_id> ISF <account_id> TIME <start> <end>
//! ```

use super::{AccountId, Amount, RequestId, Timestamp};
use std::fmt;

/// Outcome of a request, ready to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultLine {
    /// Balance read by a balance check
    Balance {
        request: RequestId,
        balance: Amount,
        start: Timestamp,
        end: Timestamp,
    },

    /// Transfer committed to every account
    Committed {
        request: RequestId,
        start: Timestamp,
        end: Timestamp,
    },

    /// Transfer aborted because a debit would overdraw `account`
    InsufficientFunds {
        request: RequestId,
        account: AccountId,
        start: Timestamp,
        end: Timestamp,
    },
}

impl ResultLine {
    /// Id of the request this line reports on
    pub fn request(&self) -> RequestId {
        match *self {
            ResultLine::Balance { request, .. }
            | ResultLine::Committed { request, .. }
            | ResultLine::InsufficientFunds { request, .. } => request,
        }
    }
}

impl fmt::Display for ResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultLine::Balance {
                request,
                balance,
                start,
                end,
            } => write!(f, "{request} BAL {balance} TIME {start} {end}"),
            ResultLine::Committed {
                request,
                start,
                end,
            } => write!(f, "{request} OK TIME {start} {end}"),
            ResultLine::InsufficientFunds {
                request,
                account,
                start,
                end,
            } => write!(f, "{request} ISF {account} TIME {start} {end}"),
        }
    }
}
