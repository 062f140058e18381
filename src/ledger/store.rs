use async_trait::async_trait;
use thiserror::Error;

use super::amount::Amount;
use super::transfer::{Account, AccountId, Transfer, TransferId};

pub type Result<T> = core::result::Result<T, StoreError>;

/// Failures reported by a [`LedgerStore`] implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
  #[error("account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("account already exists: {0}")]
  DuplicatedAccountId(AccountId),

  #[error("transfer id already recorded: {0}")]
  DuplicatedTransferId(TransferId),

  #[error("balance mutation would go negative for account: {0}")]
  WouldGoNegative(AccountId),

  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

/// Interface to the durable state of the ledger: the account store and the
/// append-only transaction log, which share one durability boundary.
///
/// The store exclusively owns balance state. Callers that need to mutate it
/// acquire an atomic unit with [`LedgerStore::begin`] and perform every read
/// and write of the transfer through that unit, so no decision is ever made
/// on data read outside of it.
#[async_trait]
pub trait LedgerStore: Send + Sync {
  type Unit: StoreUnit;

  /// Create a new account. Fails with [`StoreError::DuplicatedAccountId`]
  /// if the id is already taken, which the caller uses to detect id
  /// collisions.
  async fn create_account(&self, account: Account) -> Result<()>;

  /// Point read of the current committed balance.
  async fn balance(&self, account_id: &AccountId) -> Result<Amount>;

  /// Committed transfers where the account is sender or receiver, most
  /// recent first, bounded to `limit` entries. Re-querying is idempotent.
  async fn list_for(&self, account_id: &AccountId, limit: usize) -> Result<Vec<Transfer>>;

  /// Begin an atomic unit covering the two given accounts, acquiring
  /// exclusive access to both before any of them can be read or mutated.
  /// Acquisition is bounded by the store's lock timeout.
  ///
  /// A missing account does not fail `begin`; it surfaces as
  /// [`StoreError::AccountNotFound`] when the unit is asked about it, so
  /// the caller can attribute the failure to the right side.
  async fn begin(&self, first: &AccountId, second: &AccountId) -> Result<Self::Unit>;
}

/// A scope of storage operations that commits or rolls back as a single
/// indivisible step.
///
/// Nothing performed through a unit is visible to any other reader until
/// [`StoreUnit::commit`] returns `Ok`. Dropping a unit without committing
/// discards all of its effects; there is no partial outcome on any exit
/// path.
#[async_trait]
pub trait StoreUnit: Send {
  /// Balance of an account as seen by this unit, including mutations the
  /// unit itself has staged.
  fn balance(&self, account_id: &AccountId) -> Result<Amount>;

  /// Atomically add `delta` (positive or negative) to the balance.
  /// Rejected with [`StoreError::WouldGoNegative`] if the result would be
  /// negative; the check and the mutation are indivisible because both
  /// operate on the unit's locked view.
  fn apply_delta(&mut self, account_id: &AccountId, delta: Amount) -> Result<Amount>;

  /// Stage a transfer record to be appended to the log at commit.
  /// Rejected with [`StoreError::DuplicatedTransferId`] if the id is
  /// already recorded.
  fn append(&mut self, transfer: Transfer) -> Result<()>;

  /// Make every staged mutation durable in one step. The commit timestamp
  /// of the appended transfer is assigned here.
  async fn commit(self) -> Result<()>;
}
