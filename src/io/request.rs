use std::convert::TryFrom;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ledger::Amount;
use crate::processors;

/// The types of requests supported by the reader
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
  Open,
  Transfer,
}

/// A deserializable request
#[derive(Debug, Deserialize)]
pub struct Request {
  #[serde(rename = "type")]
  kind: RequestType,

  account: String,

  to: String,

  amount: Decimal,

  description: String,

  category: String,
}

impl TryFrom<Request> for processors::Request {
  type Error = anyhow::Error;

  /// Conversion from a deserializable request into one that can be used by
  /// the domain logic. Decimal amounts become fixed-point minor units here;
  /// values the engine could not represent exactly are rejected.
  fn try_from(request: Request) -> Result<Self, Self::Error> {
    let amount = Amount::from_decimal(request.amount)?;

    Ok(match request.kind {
      RequestType::Open => processors::Request::Open {
        name: request.account,
        initial_balance: amount,
      },
      RequestType::Transfer => processors::Request::Transfer {
        from: request.account,
        to: request.to,
        amount,
        description: request.description,
        category: request.category,
      },
    })
  }
}
