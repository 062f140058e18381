use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::amount::Amount;
use super::config::LedgerConfig;
use super::store::{LedgerStore, Result, StoreError, StoreUnit};
use super::transfer::{Account, AccountId, Transfer, TransferId};

/// In-memory implementation of [`LedgerStore`].
///
/// Every account lives behind its own async mutex, so exclusive access is
/// per account and never process-wide. An atomic unit owns the guards of
/// the accounts it covers, always acquired in sorted id order so that two
/// units moving money in opposite directions between the same pair cannot
/// deadlock. Acquisition is bounded by the configured lock timeout.
pub struct InMemoryLedgerStore {
  accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
  log: Arc<RwLock<TransferLog>>,
  lock_timeout: Duration,
}

#[derive(Default)]
struct TransferLog {
  entries: Vec<Transfer>,
  ids: HashSet<TransferId>,
}

impl InMemoryLedgerStore {
  pub fn new() -> Self {
    Self::with_lock_timeout(LedgerConfig::default().lock_timeout)
  }

  pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
    Self {
      accounts: DashMap::new(),
      log: Arc::new(RwLock::new(TransferLog::default())),
      lock_timeout,
    }
  }

  /// Sum of all account balances. Only issuance through account creation
  /// can change this value; committed transfers never do.
  pub async fn total_balance(&self) -> Result<Amount> {
    let ids: Vec<AccountId> = self.accounts.iter().map(|entry| entry.key().clone()).collect();

    let mut total = Amount::ZERO;
    for id in ids {
      let guard = self.lock_account(&id).await?;
      total = total
        .checked_add(guard.balance)
        .ok_or_else(|| StoreError::Unavailable("total balance overflow".to_string()))?;
    }
    Ok(total)
  }

  async fn lock_account(&self, account_id: &AccountId) -> Result<OwnedMutexGuard<Account>> {
    let slot = self
      .accounts
      .get(account_id)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| StoreError::AccountNotFound(account_id.clone()))?;

    tokio::time::timeout(self.lock_timeout, slot.lock_owned())
      .await
      .map_err(|_| {
        StoreError::Unavailable(format!("timed out acquiring account {}", account_id))
      })
  }
}

impl Default for InMemoryLedgerStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
  type Unit = MemoryUnit;

  async fn create_account(&self, account: Account) -> Result<()> {
    match self.accounts.entry(account.id.clone()) {
      Entry::Occupied(_) => Err(StoreError::DuplicatedAccountId(account.id)),
      Entry::Vacant(vacant) => {
        debug!(
          account_id = %account.id,
          balance = %account.balance,
          created_at = %account.created_at,
          "account created"
        );
        vacant.insert(Arc::new(Mutex::new(account)));
        Ok(())
      }
    }
  }

  async fn balance(&self, account_id: &AccountId) -> Result<Amount> {
    let guard = self.lock_account(account_id).await?;
    Ok(guard.balance)
  }

  async fn list_for(&self, account_id: &AccountId, limit: usize) -> Result<Vec<Transfer>> {
    let log = self
      .log
      .read()
      .map_err(|_| StoreError::Unavailable("transfer log lock poisoned".to_string()))?;

    Ok(
      log
        .entries
        .iter()
        .rev()
        .filter(|transfer| transfer.involves(account_id))
        .take(limit)
        .cloned()
        .collect(),
    )
  }

  async fn begin(&self, first: &AccountId, second: &AccountId) -> Result<MemoryUnit> {
    let mut ids = vec![first, second];
    ids.sort();
    ids.dedup();

    let mut guards = Vec::with_capacity(ids.len());
    for id in ids {
      match self.lock_account(id).await {
        Ok(guard) => guards.push((id.clone(), guard)),
        // Missing accounts surface when the unit is asked about them, so
        // the coordinator can attribute the failure to the right side.
        Err(StoreError::AccountNotFound(_)) => {}
        Err(err) => return Err(err),
      }
    }

    Ok(MemoryUnit {
      guards,
      staged_balances: HashMap::new(),
      staged_transfer: None,
      log: Arc::clone(&self.log),
    })
  }
}

/// Atomic unit over the in-memory store.
///
/// Mutations are staged on an overlay while the unit exclusively holds the
/// covered accounts; nothing is written through the guards or into the log
/// until `commit`. Dropping the unit releases the guards and discards the
/// staging, so every early-return path rolls back by construction.
pub struct MemoryUnit {
  guards: Vec<(AccountId, OwnedMutexGuard<Account>)>,
  staged_balances: HashMap<AccountId, Amount>,
  staged_transfer: Option<Transfer>,
  log: Arc<RwLock<TransferLog>>,
}

impl MemoryUnit {
  fn guarded_balance(&self, account_id: &AccountId) -> Result<Amount> {
    self
      .guards
      .iter()
      .find(|(id, _)| id == account_id)
      .map(|(_, guard)| guard.balance)
      .ok_or_else(|| StoreError::AccountNotFound(account_id.clone()))
  }
}

#[async_trait]
impl StoreUnit for MemoryUnit {
  fn balance(&self, account_id: &AccountId) -> Result<Amount> {
    if let Some(balance) = self.staged_balances.get(account_id) {
      return Ok(*balance);
    }
    self.guarded_balance(account_id)
  }

  fn apply_delta(&mut self, account_id: &AccountId, delta: Amount) -> Result<Amount> {
    let current = self.balance(account_id)?;
    let updated = current
      .checked_add(delta)
      .ok_or_else(|| StoreError::Unavailable("balance overflow".to_string()))?;

    if updated.is_negative() {
      return Err(StoreError::WouldGoNegative(account_id.clone()));
    }

    self.staged_balances.insert(account_id.clone(), updated);
    Ok(updated)
  }

  fn append(&mut self, transfer: Transfer) -> Result<()> {
    let log = self
      .log
      .read()
      .map_err(|_| StoreError::Unavailable("transfer log lock poisoned".to_string()))?;

    if log.ids.contains(&transfer.id) {
      return Err(StoreError::DuplicatedTransferId(transfer.id));
    }
    drop(log);

    self.staged_transfer = Some(transfer);
    Ok(())
  }

  async fn commit(mut self) -> Result<()> {
    let mut log = self
      .log
      .write()
      .map_err(|_| StoreError::Unavailable("transfer log lock poisoned".to_string()))?;

    // Re-check uniqueness under the write lock; the append-time check can
    // race with another in-flight unit.
    if let Some(transfer) = &self.staged_transfer {
      if log.ids.contains(&transfer.id) {
        return Err(StoreError::DuplicatedTransferId(transfer.id.clone()));
      }
    }

    for (id, guard) in self.guards.iter_mut() {
      if let Some(balance) = self.staged_balances.get(id) {
        guard.balance = *balance;
      }
    }

    if let Some(mut transfer) = self.staged_transfer.take() {
      let now = Utc::now();
      transfer.timestamp = match log.entries.last() {
        // Clamped so timestamps stay non-decreasing in insertion order.
        Some(last) if last.timestamp > now => last.timestamp,
        _ => now,
      };

      debug!(transfer_id = %transfer.id, "transfer appended to log");
      log.ids.insert(transfer.id.clone());
      log.entries.push(transfer);
    }

    Ok(())
  }
}
