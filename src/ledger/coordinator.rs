use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::amount::Amount;
use super::config::LedgerConfig;
use super::idgen::IdGenerator;
use super::store::{LedgerStore, StoreError, StoreUnit};
use super::transfer::{Account, AccountId, Transfer, TransferId, TransferRequest};

const ACCOUNT_ID_PREFIX: &str = "acct";
const TRANSFER_ID_PREFIX: &str = "tfr";

pub type Result<T> = core::result::Result<T, TransferError>;

/// The reasons a request can be rejected. We are dealing with money, so the
/// taxonomy is deliberately specific: the caller maps each kind to its own
/// user-facing status, and retry safety differs between them.
///
/// Every storage-touching failure happens inside the atomic unit, so by the
/// time any of these is returned nothing has been persisted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransferError {
  #[error("invalid transfer request: {0}")]
  InvalidRequest(&'static str),

  #[error("transfer amount must be positive")]
  InvalidAmount,

  #[error("transfers from an account to itself are not allowed")]
  SelfTransfer,

  #[error("sender account not found: {0}")]
  SenderNotFound(AccountId),

  #[error("recipient account not found: {0}")]
  RecipientNotFound(AccountId),

  #[error("account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("not enough balance to fund the transfer")]
  InsufficientBalance,

  #[error("id generation exhausted its attempts")]
  IdGenerationExhausted,

  #[error("storage failure")]
  Storage,
}

/// Total outgoing spending of an account over its committed transfers,
/// broken down by the opaque category metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendingSummary {
  pub total_out: Amount,
  pub by_category: BTreeMap<String, Amount>,
}

/// Operation surface of the ledger engine, as consumed by an external
/// request-handling layer that supplies already-identified accounts.
#[async_trait]
pub trait Ledger {
  /// Create an account funded with `initial_balance` (externally injected
  /// issuance) and return its generated id.
  async fn open_account(&self, initial_balance: Amount) -> Result<AccountId>;

  /// Move funds between two accounts, atomically with the log entry.
  /// On commit the generated transfer id is returned; on any failure
  /// nothing is persisted.
  async fn transfer(&self, request: TransferRequest) -> Result<TransferId>;

  /// Current committed balance of an account.
  async fn balance(&self, account_id: AccountId) -> Result<Amount>;

  /// Committed transfers involving the account, most recent first.
  /// `None` means the configured default limit.
  async fn history(&self, account_id: AccountId, limit: Option<usize>) -> Result<Vec<Transfer>>;

  /// Outgoing spending of the account grouped by category.
  async fn spending_summary(&self, account_id: AccountId) -> Result<SpendingSummary>;
}

/// Implementation of [`Ledger`] that orchestrates each transfer end to end
/// against an injected [`LedgerStore`].
///
/// Validation fails fast without touching storage. Execution acquires one
/// atomic unit from the store, re-reads both balances through it, applies
/// the debit and the credit, appends the log entry and commits; every abort
/// path simply drops the unit, which discards all of its effects.
pub struct TransferCoordinator<S, G> {
  store: S,
  id_generator: G,
  config: LedgerConfig,
}

impl<S, G> TransferCoordinator<S, G>
where
  S: LedgerStore,
  G: IdGenerator,
{
  pub fn new(store: S, id_generator: G, config: LedgerConfig) -> Self {
    Self {
      store,
      id_generator,
      config,
    }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  fn validate(request: &TransferRequest) -> Result<()> {
    if request.from.is_empty() {
      Err(TransferError::InvalidRequest("missing sender account"))
    } else if request.to.is_empty() {
      Err(TransferError::InvalidRequest("missing recipient account"))
    } else if !request.amount.is_positive() {
      Err(TransferError::InvalidAmount)
    } else if request.from == request.to {
      Err(TransferError::SelfTransfer)
    } else {
      Ok(())
    }
  }

  /// Storage error detail is logged here and collapsed to the kind; the
  /// engine never exposes it beyond that.
  fn storage_failure(err: StoreError) -> TransferError {
    warn!(error = %err, "storage failure");
    TransferError::Storage
  }
}

#[async_trait]
impl<S, G> Ledger for TransferCoordinator<S, G>
where
  S: LedgerStore + Send + Sync,
  G: IdGenerator + Send + Sync,
{
  async fn open_account(&self, initial_balance: Amount) -> Result<AccountId> {
    if initial_balance.is_negative() {
      return Err(TransferError::InvalidAmount);
    }

    let mut attempts = 0;
    loop {
      let account_id = AccountId::new(self.id_generator.next(ACCOUNT_ID_PREFIX));
      let account = Account::new(account_id.clone(), initial_balance);

      match self.store.create_account(account).await {
        Ok(()) => {
          info!(account_id = %account_id, balance = %initial_balance, "account opened");
          return Ok(account_id);
        }
        Err(StoreError::DuplicatedAccountId(_)) => {
          attempts += 1;
          if attempts >= self.config.max_id_attempts {
            return Err(TransferError::IdGenerationExhausted);
          }
        }
        Err(err) => return Err(Self::storage_failure(err)),
      }
    }
  }

  async fn transfer(&self, request: TransferRequest) -> Result<TransferId> {
    Self::validate(&request)?;

    let mut unit = self
      .store
      .begin(&request.from, &request.to)
      .await
      .map_err(Self::storage_failure)?;

    let sender_balance = match unit.balance(&request.from) {
      Ok(balance) => balance,
      Err(StoreError::AccountNotFound(_)) => {
        return Err(TransferError::SenderNotFound(request.from));
      }
      Err(err) => return Err(Self::storage_failure(err)),
    };

    match unit.balance(&request.to) {
      Ok(_) => {}
      Err(StoreError::AccountNotFound(_)) => {
        return Err(TransferError::RecipientNotFound(request.to));
      }
      Err(err) => return Err(Self::storage_failure(err)),
    }

    // Balance check against the unit's own locked view, the same one the
    // debit below mutates.
    if sender_balance < request.amount {
      warn!(from = %request.from, amount = %request.amount, "transfer rejected: insufficient balance");
      return Err(TransferError::InsufficientBalance);
    }

    match unit.apply_delta(&request.from, -request.amount) {
      Ok(_) => {}
      Err(StoreError::WouldGoNegative(_)) => return Err(TransferError::InsufficientBalance),
      Err(err) => return Err(Self::storage_failure(err)),
    }

    if let Err(err) = unit.apply_delta(&request.to, request.amount) {
      return Err(Self::storage_failure(err));
    }

    let mut attempts = 0;
    let transfer_id = loop {
      let id = TransferId::new(self.id_generator.next(TRANSFER_ID_PREFIX));
      match unit.append(Transfer::from_request(id.clone(), &request)) {
        Ok(()) => break id,
        Err(StoreError::DuplicatedTransferId(_)) => {
          attempts += 1;
          if attempts >= self.config.max_id_attempts {
            return Err(TransferError::IdGenerationExhausted);
          }
        }
        Err(err) => return Err(Self::storage_failure(err)),
      }
    };

    match unit.commit().await {
      Ok(()) => {}
      // A collision slipping past the append-time check is still a
      // uniqueness violation surfaced by the store.
      Err(StoreError::DuplicatedTransferId(_)) => return Err(TransferError::IdGenerationExhausted),
      Err(err) => return Err(Self::storage_failure(err)),
    }

    info!(
      transfer_id = %transfer_id,
      from = %request.from,
      to = %request.to,
      amount = %request.amount,
      "transfer committed"
    );

    Ok(transfer_id)
  }

  async fn balance(&self, account_id: AccountId) -> Result<Amount> {
    match self.store.balance(&account_id).await {
      Ok(balance) => Ok(balance),
      Err(StoreError::AccountNotFound(_)) => Err(TransferError::AccountNotFound(account_id)),
      Err(err) => Err(Self::storage_failure(err)),
    }
  }

  async fn history(&self, account_id: AccountId, limit: Option<usize>) -> Result<Vec<Transfer>> {
    // Existence check first, so an unknown account is distinguishable from
    // one that simply has no transfers yet.
    self.balance(account_id.clone()).await?;

    let limit = limit.unwrap_or(self.config.default_history_limit);
    self
      .store
      .list_for(&account_id, limit)
      .await
      .map_err(Self::storage_failure)
  }

  async fn spending_summary(&self, account_id: AccountId) -> Result<SpendingSummary> {
    self.balance(account_id.clone()).await?;

    let transfers = self
      .store
      .list_for(&account_id, usize::MAX)
      .await
      .map_err(Self::storage_failure)?;

    let mut summary = SpendingSummary::default();
    for transfer in transfers.iter().filter(|t| t.from == account_id) {
      summary.total_out = summary
        .total_out
        .checked_add(transfer.amount)
        .ok_or(TransferError::Storage)?;

      let spent = summary
        .by_category
        .entry(transfer.category.clone())
        .or_insert(Amount::ZERO);
      *spent = spent.checked_add(transfer.amount).ok_or(TransferError::Storage)?;
    }

    Ok(summary)
  }
}
