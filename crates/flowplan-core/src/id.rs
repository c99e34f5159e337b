//! Identifier sources for newly created entities.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces collision-resistant identifiers for new transactions.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic identifiers (`00000000-…-0001`, `…-0002`, …) for reproducible runs.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            counter: AtomicU64::new(first.saturating_sub(1)),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Uuid {
        let value = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(value as u128)
    }
}
