//! Final balances report
//!
//! Writes account balances as CSV with columns: account, balance. Accounts
//! are sorted by id for deterministic output.

use crate::types::{Account, BankError};
use std::io::Write;

/// Write account balances to CSV format
///
/// # Errors
///
/// Returns an error if serialization or the underlying write fails.
pub fn write_balances_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), BankError> {
    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    let mut writer = csv::Writer::from_writer(output);
    for account in &sorted_accounts {
        writer.serialize(account).map_err(|e| BankError::IoError {
            message: format!("Failed to write balance record: {}", e),
        })?;
    }
    writer.flush()?;

    Ok(())
}
