use std::fmt;

use chrono::{DateTime, Utc};

use super::amount::Amount;

/// Opaque unique identifier of an account, immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(String);

impl AccountId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Display for AccountId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for AccountId {
  fn from(s: &str) -> Self {
    Self::new(s)
  }
}

/// Opaque unique identifier of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferId(String);

impl TransferId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TransferId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for TransferId {
  fn from(s: &str) -> Self {
    Self::new(s)
  }
}

/// An account as stored: an id and its current balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
  pub id: AccountId,
  pub balance: Amount,
  pub created_at: DateTime<Utc>,
}

impl Account {
  pub fn new(id: AccountId, balance: Amount) -> Self {
    Self {
      id,
      balance,
      created_at: Utc::now(),
    }
  }
}

/// A request to move funds between two accounts, as accepted for processing.
/// `description` and `category` are opaque metadata that the engine records
/// but never interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
  pub from: AccountId,
  pub to: AccountId,
  pub amount: Amount,
  pub description: String,
  pub category: String,
}

impl TransferRequest {
  pub fn new(
    from: AccountId,
    to: AccountId,
    amount: Amount,
    description: impl Into<String>,
    category: impl Into<String>,
  ) -> Self {
    Self {
      from,
      to,
      amount,
      description: description.into(),
      category: category.into(),
    }
  }
}

/// A committed transfer as recorded in the transaction log.
/// The timestamp is assigned at commit time and is non-decreasing in
/// insertion order; records are never mutated nor deleted after commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
  pub id: TransferId,
  pub from: AccountId,
  pub to: AccountId,
  pub amount: Amount,
  pub description: String,
  pub category: String,
  pub timestamp: DateTime<Utc>,
}

impl Transfer {
  pub fn from_request(id: TransferId, request: &TransferRequest) -> Self {
    Self {
      id,
      from: request.from.clone(),
      to: request.to.clone(),
      amount: request.amount,
      description: request.description.clone(),
      category: request.category.clone(),
      timestamp: Utc::now(),
    }
  }

  pub fn involves(&self, account_id: &AccountId) -> bool {
    self.from == *account_id || self.to == *account_id
  }
}

#[cfg(test)]
mod tests {

  use super::*;

  fn request() -> TransferRequest {
    TransferRequest::new(
      AccountId::from("acct-1"),
      AccountId::from("acct-2"),
      Amount::from_minor_units(20000),
      "lunch",
      "food",
    )
  }

  #[test]
  fn transfer_from_request_copies_fields() {
    let transfer = Transfer::from_request(TransferId::new("tfr-1"), &request());

    assert_eq!(transfer.id, TransferId::new("tfr-1"));
    assert_eq!(transfer.from, AccountId::from("acct-1"));
    assert_eq!(transfer.to, AccountId::from("acct-2"));
    assert_eq!(transfer.amount, Amount::from_minor_units(20000));
    assert_eq!(transfer.description, "lunch");
    assert_eq!(transfer.category, "food");
  }

  #[test]
  fn transfer_involves_either_side() {
    let transfer = Transfer::from_request(TransferId::new("tfr-1"), &request());

    assert!(transfer.involves(&AccountId::from("acct-1")));
    assert!(transfer.involves(&AccountId::from("acct-2")));
    assert!(!transfer.involves(&AccountId::from("acct-3")));
  }

  #[test]
  fn account_ids_order_by_string() {
    let mut ids = vec![AccountId::from("acct-b"), AccountId::from("acct-a")];
    ids.sort();

    assert_eq!(ids, vec![AccountId::from("acct-a"), AccountId::from("acct-b")]);
  }
}
