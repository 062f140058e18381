use rust_decimal::Decimal;
use serde::Serialize;

use crate::processors;

/// A closing balance row used to serialize the report into a CSV file
#[derive(Debug, PartialEq, Serialize)]
pub struct BalanceRecord {
  account: String,
  id: String,
  balance: Decimal,
}

impl From<processors::BalanceReport> for BalanceRecord {
  /// A conversion between the domain representation of a balance report
  /// into a serializable structure
  fn from(report: processors::BalanceReport) -> Self {
    BalanceRecord {
      account: report.name,
      balance: report.balance.to_decimal(),
      id: report.account_id.as_str().to_string(),
    }
  }
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;

  use super::*;
  use crate::ledger::{AccountId, Amount};

  #[test]
  fn from_processors_balance_report() {
    let report = processors::BalanceReport::new(
      "alice",
      AccountId::from("acct-1"),
      Amount::from_minor_units(30000),
    );

    let record: BalanceRecord = report.into();

    assert_eq!(
      record,
      BalanceRecord {
        account: "alice".to_string(),
        id: "acct-1".to_string(),
        balance: dec!(300.00),
      }
    )
  }
}
