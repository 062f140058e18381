use std::time::Duration;

/// Configuration of the transaction engine.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
  /// Upper bound for acquiring exclusive access to an account. Exceeding
  /// it is reported as a storage failure, never as an indefinite block.
  pub lock_timeout: Duration,
  /// How many times id generation is retried on a detected collision
  /// before giving up.
  pub max_id_attempts: usize,
  /// Number of entries returned by a history query when the caller does
  /// not specify a limit.
  pub default_history_limit: usize,
}

impl Default for LedgerConfig {
  fn default() -> Self {
    Self {
      lock_timeout: Duration::from_secs(5),
      max_id_attempts: 5,
      default_history_limit: 20,
    }
  }
}

impl LedgerConfig {
  pub fn validate(&self) -> Result<(), String> {
    if self.lock_timeout.as_millis() == 0 {
      return Err("lock timeout cannot be zero".to_string());
    }

    if self.max_id_attempts == 0 {
      return Err("id generation needs at least one attempt".to_string());
    }

    if self.default_history_limit == 0 {
      return Err("default history limit cannot be zero".to_string());
    }

    Ok(())
  }
}
