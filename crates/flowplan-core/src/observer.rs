//! Post-mutation hooks for persistence and sync adapters.

use flowplan_domain::Transaction;
use uuid::Uuid;

use crate::CoreError;

/// What triggered a change to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    /// A recorded mutation from a caller.
    Direct,
    /// A caller mutation applied with history skipped.
    Untracked,
    Undo,
    Redo,
    Reset,
    Restore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change<'a> {
    Added(&'a Transaction),
    Updated {
        before: &'a Transaction,
        after: &'a Transaction,
    },
    Deleted(&'a Transaction),
    /// The whole collection was replaced from a snapshot.
    Replaced,
    Cleared,
}

/// Describes a single applied change together with the resulting collection.
#[derive(Debug, Clone)]
pub struct MutationEvent<'a> {
    pub scenario_id: Uuid,
    pub revision: u64,
    pub origin: MutationOrigin,
    pub change: Change<'a>,
    pub transactions: &'a [Transaction],
}

/// Receives every change applied by a [`crate::TransactionStore`].
///
/// Errors are logged by the store and never roll back the in-memory change.
pub trait MutationObserver: Send + Sync {
    fn on_mutation(&self, event: &MutationEvent<'_>) -> Result<(), CoreError>;
}
