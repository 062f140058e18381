use std::convert::TryFrom;

use anyhow::Result;
use tokio::io::AsyncRead;
use tokio_stream::{Stream, StreamExt};

use crate::processors::Request;

/// Number of columns of the requests format: type, account, to, amount,
/// description, category.
const NUM_FIELDS: usize = 6;

/// Interface to read requests from an external source
pub trait RequestsReader {
  /// Read requests and return an [`Stream`] of possibly successful requests.
  /// Each item yielded by the stream is either `Ok` if the request was read successfully,
  /// or `Err` if there was any kind of problem (like wrong format).
  fn read_requests<'a>(&'a mut self) -> Box<dyn Stream<Item = Result<Request>> + Unpin + 'a>;
}

/// Implementation of [`RequestsReader`] for the CSV format.
pub struct CsvRequestsReader<R>(R);

impl<R> CsvRequestsReader<R>
where
  R: AsyncRead + Unpin + Send + Sync,
{
  pub fn new(reader: R) -> Self {
    Self(reader)
  }
}

impl<R> RequestsReader for CsvRequestsReader<R>
where
  R: AsyncRead + Unpin + Send + Sync,
{
  fn read_requests<'a>(&'a mut self) -> Box<dyn Stream<Item = Result<Request>> + Unpin + 'a> {
    Box::new(
      csv_async::AsyncReaderBuilder::new()
        .flexible(true)
        .create_reader(&mut self.0)
        .into_records()
        .map(|maybe_record| {
          maybe_record
            .and_then(|mut record| {
              record.trim();
              while record.len() < NUM_FIELDS {
                record.push_field("");
              }
              record.deserialize::<super::request::Request>(None)
            })
            .map_err(anyhow::Error::from)
            .and_then(Request::try_from)
        }),
    )
  }
}

#[cfg(test)]
mod tests {

  use indoc::indoc;

  use super::*;
  use crate::ledger::Amount;

  #[tokio::test]
  async fn read_requests_with_format_errors() {
    let input = indoc! { "
      type,      account,   to,     amount,  description, category
      open
      open,,,
      transfer,  alice,     bob
      transfer,  alice,     bob,    0.005
      open,      carol,     ,       10.123
      unknown,   alice,     bob,    10
    " }
    .as_bytes();

    let mut reader = CsvRequestsReader::new(input);

    let requests = reader
      .read_requests()
      .map(|request| request.map(|_| "ok").unwrap_or_else(|_| "err"))
      .collect::<Vec<&str>>()
      .await;

    assert_eq!(requests.iter().filter(|v| **v == "err").count(), 6);
    assert_eq!(requests.iter().filter(|v| **v == "ok").count(), 0);
  }

  #[tokio::test]
  async fn read_requests_success() {
    let input = indoc! { "
      type,      account,  to,    amount,  description, category
      open,      alice,    ,      500.00
      open,      bob,      ,      100
       transfer, alice,    bob,   200.5,   lunch,       food
      transfer,  bob,      alice, 10,      ,
    " }
    .as_bytes();

    let mut reader = CsvRequestsReader::new(input);

    let requests = reader
      .read_requests()
      .map(|request| request.map_err(|err| err.to_string()))
      .collect::<Vec<Result<Request, String>>>()
      .await;

    assert_eq!(
      requests,
      vec![
        Ok(Request::Open {
          name: "alice".to_string(),
          initial_balance: Amount::from_minor_units(50000),
        }),
        Ok(Request::Open {
          name: "bob".to_string(),
          initial_balance: Amount::from_minor_units(10000),
        }),
        Ok(Request::Transfer {
          from: "alice".to_string(),
          to: "bob".to_string(),
          amount: Amount::from_minor_units(20050),
          description: "lunch".to_string(),
          category: "food".to_string(),
        }),
        Ok(Request::Transfer {
          from: "bob".to_string(),
          to: "alice".to_string(),
          amount: Amount::from_minor_units(1000),
          description: "".to_string(),
          category: "".to_string(),
        }),
      ]
    )
  }
}
