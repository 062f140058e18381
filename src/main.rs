mod io;
mod ledger;
mod processors;

use anyhow::Result;
use tokio::io::AsyncRead;
use tracing_subscriber::EnvFilter;

use crate::io::{CsvBalancesReportWriter, CsvRequestsReader};
use ledger::{InMemoryLedgerStore, LedgerConfig, RandomIdGenerator, TransferCoordinator};

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();

  let config = LedgerConfig::default();
  config.validate().map_err(anyhow::Error::msg)?;

  let reader = get_requests_async_read().await?;
  let requests_reader = CsvRequestsReader::new(reader);
  let ledger = TransferCoordinator::new(
    InMemoryLedgerStore::with_lock_timeout(config.lock_timeout),
    RandomIdGenerator,
    config,
  );
  let balances_report_writer = CsvBalancesReportWriter::new(tokio::io::stdout());

  processors::simple::run(requests_reader, ledger, balances_report_writer).await
}

/// Logs go to stderr so they never interleave with the CSV report on stdout.
fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .init();
}

type RequestsAsyncRead = Box<dyn AsyncRead + Unpin + Send + Sync>;

/// This allows to use either a file if the path is specified in the command line,
/// or the stdin otherwise, which might be more convenient for pipe the data.
async fn get_requests_async_read() -> Result<RequestsAsyncRead> {
  match std::env::args().nth(1) {
    Some(path) => tokio::fs::File::open(path)
      .await
      .map(|file| Box::new(file) as RequestsAsyncRead)
      .map_err(anyhow::Error::from),
    None => Ok(Box::new(tokio::io::stdin()) as RequestsAsyncRead),
  }
}
