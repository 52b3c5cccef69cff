//! Command text format
//!
//! Converts the tokens of one input line into a [`RequestKind`]:
//!
//! ```text
//! CHECK <account_id>
//! TRANS <account_id> <amount> [<account_id> <amount> ...]
//! END
//! ```
//!
//! Keywords are case-insensitive. All functions are pure (no I/O) for easy
//! testing.

use crate::types::{AccountId, Amount, BankError, RequestKind, Transaction, Transfer};
use std::str::FromStr;

/// Parse the tokens of one non-blank line
///
/// `line` is only used to annotate errors.
pub fn parse_command(tokens: &[&str], line: Option<u64>) -> Result<RequestKind, BankError> {
    let (keyword, args) = tokens
        .split_first()
        .ok_or_else(|| BankError::parse(line, "empty command"))?;

    match keyword.to_ascii_uppercase().as_str() {
        "CHECK" => match args {
            [account] => Ok(RequestKind::BalanceCheck {
                account: parse_number::<AccountId>(account, "account id", line)?,
            }),
            _ => Err(BankError::parse(
                line,
                format!("CHECK takes exactly one account id, got {} tokens", args.len()),
            )),
        },
        "TRANS" => parse_transfer(args, line).map(RequestKind::Transfer),
        "END" => {
            if args.is_empty() {
                Ok(RequestKind::Shutdown)
            } else {
                Err(BankError::parse(line, "END takes no arguments"))
            }
        }
        other => Err(BankError::parse(line, format!("unknown command '{}'", other))),
    }
}

fn parse_transfer(args: &[&str], line: Option<u64>) -> Result<Transfer, BankError> {
    if args.is_empty() {
        return Err(BankError::parse(line, "TRANS requires at least one account/amount pair"));
    }
    if args.len() % 2 != 0 {
        return Err(BankError::parse(
            line,
            format!("TRANS requires account/amount pairs, got {} tokens", args.len()),
        ));
    }

    let transactions = args
        .chunks_exact(2)
        .map(|pair| {
            Ok(Transaction::new(
                parse_number::<AccountId>(pair[0], "account id", line)?,
                parse_number::<Amount>(pair[1], "amount", line)?,
            ))
        })
        .collect::<Result<Vec<_>, BankError>>()?;

    Transfer::new(transactions).map_err(|e| BankError::parse(line, e.to_string()))
}

fn parse_number<T: FromStr>(token: &str, what: &str, line: Option<u64>) -> Result<T, BankError> {
    token
        .parse()
        .map_err(|_| BankError::parse(line, format!("invalid {} '{}'", what, token)))
}
