use std::collections::BTreeMap;

use anyhow::Result;
use tokio_stream::StreamExt;

use super::{BalanceReport, Request};
use crate::io::{BalancesReportWriter, RequestsReader};
use crate::ledger::{AccountId, Ledger, TransferRequest};

/// This is a simple processor of transfer requests that
/// - reads requests from a [`RequestsReader`]
/// - opens accounts and executes transfers using a [`Ledger`]
/// - writes a report with the closing balances using a [`BalancesReportWriter`]
///
/// The idea is that all those components can be replaced with different implementations.
///
/// Accounts in the input are referred to by a caller-chosen name, while the
/// ledger only deals with the ids it generated, so this processor keeps the
/// mapping between the two. A transfer that names an account never opened is
/// a malformed row, not a ledger rejection, and is skipped before reaching
/// the engine.
///
/// This processor tries to be as resilient as possible, meaning that:
/// - errors from the requests reader will be skipped
/// - rejections from the ledger will be skipped
///
/// In the reality, those errors should be instrumented as metrics and/or logs that can be tracked and alerted on.
///
/// Following similar ideas, and thanks the way that the architecture have been designed,
/// it shouldn't be too difficult to write other kind of processors, like an HTTP
/// server where each request is handled concurrently against the same [`Ledger`].
///
pub async fn run<R, L, W>(
  mut requests_reader: R,
  ledger: L,
  mut balances_report_writer: W,
) -> Result<()>
where
  R: RequestsReader,
  L: Ledger,
  W: BalancesReportWriter,
{
  let mut aliases = BTreeMap::<String, AccountId>::new();

  let mut requests = requests_reader.read_requests();

  while let Some(maybe_request) = requests.next().await {
    if let Ok(request) = maybe_request {
      match request {
        Request::Open {
          name,
          initial_balance,
        } => {
          if !aliases.contains_key(&name) {
            if let Ok(account_id) = ledger.open_account(initial_balance).await {
              aliases.insert(name, account_id);
            }
          }
        }
        Request::Transfer {
          from,
          to,
          amount,
          description,
          category,
        } => {
          if let (Some(from), Some(to)) = (aliases.get(&from), aliases.get(&to)) {
            ledger
              .transfer(TransferRequest::new(
                from.clone(),
                to.clone(),
                amount,
                description,
                category,
              ))
              .await
              .ok();
          }
        }
      }
    }
  }

  let mut report = Vec::with_capacity(aliases.len());
  for (name, account_id) in &aliases {
    let balance = ledger.balance(account_id.clone()).await?;
    report.push(BalanceReport::new(
      name.clone(),
      account_id.clone(),
      balance,
    ));
  }

  balances_report_writer
    .write_balances_report(report.into_iter())
    .await
}
