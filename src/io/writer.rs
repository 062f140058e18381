use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio_stream::StreamExt;

use crate::processors::BalanceReport;

/// Interface for a balances report writer
#[async_trait(?Send)]
pub trait BalancesReportWriter {
  /// Write the closing balances provided by the [`Iterator`] and return whether the operation was successful or not.
  async fn write_balances_report<'a, T>(&'a mut self, report: T) -> Result<()>
  where
    T: Iterator<Item = BalanceReport> + 'a;
}

/// An implementation of [`BalancesReportWriter`] for the CSV format.
pub struct CsvBalancesReportWriter<W>(W);

impl<W> CsvBalancesReportWriter<W>
where
  W: AsyncWrite + Unpin + Send + Sync,
{
  pub fn new(writer: W) -> Self {
    Self(writer)
  }
}

#[async_trait(?Send)]
impl<W> BalancesReportWriter for CsvBalancesReportWriter<W>
where
  W: AsyncWrite + Unpin + Send + Sync,
{
  async fn write_balances_report<'a, T>(&'a mut self, report: T) -> Result<()>
  where
    T: Iterator<Item = BalanceReport> + 'a,
  {
    let mut report = Box::pin(tokio_stream::iter(
      report.map(super::balance::BalanceRecord::from),
    ));

    let mut serializer = csv_async::AsyncSerializer::from_writer(&mut self.0);
    while let Some(balance_record) = report.next().await {
      serializer.serialize(balance_record).await?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {

  use std::io::Cursor;
  use std::iter;

  use super::*;
  use crate::ledger::{AccountId, Amount};

  fn report() -> Vec<BalanceReport> {
    vec![
      BalanceReport::new(
        "alice",
        AccountId::from("acct-1"),
        Amount::from_minor_units(30000),
      ),
      BalanceReport::new(
        "bob",
        AccountId::from("acct-2"),
        Amount::from_minor_units(30000),
      ),
    ]
  }

  #[tokio::test]
  async fn write_balances_report_fails() {
    let buff: &mut [u8] = &mut [0u8, 0, 0, 0];
    let mut buffer = Cursor::new(buff);
    let mut writer = CsvBalancesReportWriter::new(&mut buffer);

    let result = writer.write_balances_report(report().into_iter()).await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn write_balances_empty() {
    let mut buffer = Vec::<u8>::with_capacity(1024);
    let mut writer = CsvBalancesReportWriter::new(&mut buffer);

    let result = writer.write_balances_report(iter::empty()).await;

    assert!(result.is_ok());
    assert_eq!(String::from_utf8_lossy(buffer.as_slice()), "".to_string())
  }

  #[tokio::test]
  async fn write_balances_report_success() {
    let mut buffer = Vec::<u8>::with_capacity(1024);
    let mut writer = CsvBalancesReportWriter::new(&mut buffer);

    let result = writer.write_balances_report(report().into_iter()).await;

    assert!(result.is_ok());
    assert_eq!(
      String::from_utf8_lossy(buffer.as_slice()),
      "account,id,balance\nalice,acct-1,300.00\nbob,acct-2,300.00\n".to_string()
    )
  }
}
