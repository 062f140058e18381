use uuid::Uuid;

/// Interface for generating identifiers unique within a namespace.
///
/// Uniqueness is an explicit contract: the generated space is large enough
/// that collisions are negligible, and on top of that the coordinator
/// retries generation a bounded number of times whenever the store surfaces
/// a collision at insert time.
pub trait IdGenerator: Send + Sync {
  fn next(&self, prefix: &str) -> String;
}

/// [`IdGenerator`] drawing from a 122-bit random space.
#[derive(Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
  fn next(&self, prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
  }
}

#[cfg(test)]
mod tests {

  use std::collections::HashSet;

  use super::*;

  #[test]
  fn ids_carry_the_namespace_prefix() {
    let generator = RandomIdGenerator;

    assert!(generator.next("acct").starts_with("acct-"));
    assert!(generator.next("tfr").starts_with("tfr-"));
  }

  #[test]
  fn ids_do_not_repeat() {
    let generator = RandomIdGenerator;

    let ids: HashSet<String> = (0..1000).map(|_| generator.next("tfr")).collect();

    assert_eq!(ids.len(), 1000);
  }
}
