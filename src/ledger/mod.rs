//! This module contains the domain logic of the ledger transaction engine
//!
//! The [`TransferCoordinator`] orchestrates transfers against a [`LedgerStore`],
//! whose [`InMemoryLedgerStore`] implementation keeps balances and the
//! transaction log behind per-account locks and an explicit atomic unit.
//

mod amount;
mod config;
mod coordinator;
mod idgen;
mod memory;
mod store;
mod transfer;

#[cfg(test)]
pub(crate) use coordinator::Result as LedgerResult;

pub use amount::{Amount, AmountError};
pub use config::LedgerConfig;
pub use coordinator::{Ledger, SpendingSummary, TransferCoordinator, TransferError};
pub use idgen::{IdGenerator, RandomIdGenerator};
pub use memory::InMemoryLedgerStore;
pub use store::{LedgerStore, StoreError, StoreUnit};
pub use transfer::{Account, AccountId, Transfer, TransferId, TransferRequest};
