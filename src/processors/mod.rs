//! This module contains processors that wire a requests reader, the ledger
//! engine and a report writer together.

pub mod simple;

use crate::ledger::{AccountId, Amount};

/// A request as read from the batch input. Accounts are referred to by a
/// caller-chosen name; the engine only ever sees the ids it generated, so
/// the name-to-id mapping stays on this side of the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
  Open {
    name: String,
    initial_balance: Amount,
  },
  Transfer {
    from: String,
    to: String,
    amount: Amount,
    description: String,
    category: String,
  },
}

/// Closing balance of an opened account, used to export the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
  pub name: String,
  pub account_id: AccountId,
  pub balance: Amount,
}

impl BalanceReport {
  pub fn new(name: impl Into<String>, account_id: AccountId, balance: Amount) -> Self {
    Self {
      name: name.into(),
      account_id,
      balance,
    }
  }
}
