//! This module contains all the components needed to read and write data from files (specifically CSV)
//!
//! The [`reader`] module contains a reader of requests from CSV and [`writer`] modules contains a balances report writer into CSV.
//! It would be possible to add new file formats by implementing the traits [`RequestsReader`] and [`BalancesReportWriter`] respectively.
//!
//! The [`request`] and [`balance`] modules contain structs needed to serialize/deserialize data.
//! They are intentionally duplicated from the domain model to decouple the IO details from the domain logic and allow their evolution independently.
//!

mod balance;
mod reader;
mod request;
mod writer;

pub use reader::{CsvRequestsReader, RequestsReader};
pub use writer::{BalancesReportWriter, CsvBalancesReportWriter};
