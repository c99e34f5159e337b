//! In-memory transaction collection with invertible, bounded history.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use flowplan_domain::{
    Displayable, HistoryAction, Transaction, TransactionDraft, TransactionPatch,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    history::{HistoryMode, HistoryStack, HISTORY_LIMIT},
    id::{IdGenerator, UuidGenerator},
    observer::{Change, MutationEvent, MutationObserver, MutationOrigin},
    validation::ValidationService,
    CoreError,
};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Owns one scenario's transactions plus its undo and redo stacks.
///
/// Single-writer: every operation takes `&mut self` and runs to completion.
/// Hosts sharing a store across threads must wrap it in a mutex.
pub struct TransactionStore {
    scenario_id: Uuid,
    instance: u64,
    transactions: Vec<Transaction>,
    undo_stack: HistoryStack,
    redo_stack: HistoryStack,
    revision: u64,
    ids: Arc<dyn IdGenerator>,
    observers: Vec<Arc<dyn MutationObserver>>,
}

impl TransactionStore {
    pub fn new(scenario_id: Uuid) -> Self {
        Self::with_capacity(scenario_id, HISTORY_LIMIT)
    }

    pub fn with_capacity(scenario_id: Uuid, history_capacity: usize) -> Self {
        Self {
            scenario_id,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            transactions: Vec::new(),
            undo_stack: HistoryStack::with_capacity(history_capacity),
            redo_stack: HistoryStack::with_capacity(history_capacity),
            revision: 0,
            ids: Arc::new(UuidGenerator),
            observers: Vec::new(),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn subscribe(&mut self, observer: Arc<dyn MutationObserver>) {
        self.observers.push(observer);
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub fn scenario_id(&self) -> Uuid {
        self.scenario_id
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn undo_stack(&self) -> &HistoryStack {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &HistoryStack {
        &self.redo_stack
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Monotonic counter bumped by every change to the collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Process-unique number identifying this store. Two stores for the same
    /// scenario can share a revision but never an instance.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Uuid {
        self.add_transaction_with(draft, HistoryMode::Record)
    }

    /// Appends the draft, assigning a fresh id unless it carries one.
    ///
    /// A draft whose id is already stored overwrites that transaction and is
    /// recorded as an update, so undo brings the previous state back.
    pub fn add_transaction_with(&mut self, draft: TransactionDraft, mode: HistoryMode) -> Uuid {
        let origin = caller_origin(mode);
        let txn = self.materialize(draft);
        let id = txn.id;
        if self.position(id).is_some() {
            warn!(scenario = %self.scenario_id, %id, "add with existing id, overwriting");
            if let Some((before, after)) =
                self.patch_entry(id, &TransactionPatch::from(&txn), origin)
            {
                if mode == HistoryMode::Record {
                    self.record(HistoryAction::Update { before, after });
                }
            }
            return id;
        }
        self.insert_entry(txn.clone(), None, origin);
        if mode == HistoryMode::Record {
            self.record(HistoryAction::Add { transaction: txn });
        }
        id
    }

    /// Adds every draft and records them as a single undoable step.
    ///
    /// Drafts carrying an id that is already taken, by the collection or by an
    /// earlier draft of the batch, get a fresh one.
    pub fn add_transactions(&mut self, drafts: Vec<TransactionDraft>) -> Vec<Uuid> {
        if drafts.is_empty() {
            return Vec::new();
        }
        let mut added: Vec<Transaction> = Vec::with_capacity(drafts.len());
        for mut draft in drafts {
            if let Some(id) = draft.id {
                if self.position(id).is_some() {
                    warn!(
                        scenario = %self.scenario_id,
                        %id,
                        "bulk add id already taken, assigning a new one"
                    );
                    draft.id = None;
                }
            }
            let txn = self.materialize(draft);
            self.insert_entry(txn.clone(), None, MutationOrigin::Direct);
            added.push(txn);
        }
        let ids = added.iter().map(|txn| txn.id).collect();
        self.record(HistoryAction::BulkAdd {
            transactions: added,
        });
        ids
    }

    pub fn update_transaction(&mut self, id: Uuid, patch: TransactionPatch) -> bool {
        self.update_transaction_with(id, patch, HistoryMode::Record)
    }

    /// Merges `patch` over the stored transaction. Unknown ids are a no-op.
    pub fn update_transaction_with(
        &mut self,
        id: Uuid,
        patch: TransactionPatch,
        mode: HistoryMode,
    ) -> bool {
        match self.patch_entry(id, &patch, caller_origin(mode)) {
            Some((before, after)) => {
                if mode == HistoryMode::Record {
                    self.record(HistoryAction::Update { before, after });
                }
                true
            }
            None => false,
        }
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> bool {
        self.delete_transaction_with(id, HistoryMode::Record)
    }

    /// Removes the transaction. Unknown ids are a no-op.
    pub fn delete_transaction_with(&mut self, id: Uuid, mode: HistoryMode) -> bool {
        match self.remove_entry(id, caller_origin(mode)) {
            Some((transaction, position)) => {
                if mode == HistoryMode::Record {
                    self.record(HistoryAction::Delete {
                        transaction,
                        position,
                    });
                }
                true
            }
            None => false,
        }
    }

    /// Validating variant of [`Self::add_transaction`].
    pub fn try_add_transaction(&mut self, draft: TransactionDraft) -> Result<Uuid, CoreError> {
        ValidationService::check_draft(&draft)?;
        Ok(self.add_transaction(draft))
    }

    /// Like [`Self::update_transaction`] but reports invalid patches and unknown ids.
    pub fn try_update_transaction(
        &mut self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<(), CoreError> {
        ValidationService::check_patch(&patch)?;
        if self.update_transaction(id, patch) {
            Ok(())
        } else {
            Err(CoreError::TransactionNotFound(id))
        }
    }

    /// Like [`Self::delete_transaction`] but reports unknown ids.
    pub fn try_delete_transaction(&mut self, id: Uuid) -> Result<(), CoreError> {
        if self.delete_transaction(id) {
            Ok(())
        } else {
            Err(CoreError::TransactionNotFound(id))
        }
    }

    /// Reverts the most recent action. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        let action = self.refresh_added(action);
        debug!(scenario = %self.scenario_id, kind = %action.kind(), "undo");
        match &action {
            HistoryAction::Add { transaction } => {
                self.remove_entry(transaction.id, MutationOrigin::Undo);
            }
            HistoryAction::BulkAdd { transactions } => {
                for txn in transactions.iter().rev() {
                    self.remove_entry(txn.id, MutationOrigin::Undo);
                }
            }
            HistoryAction::Delete {
                transaction,
                position,
            } => {
                self.insert_entry(transaction.clone(), Some(*position), MutationOrigin::Undo);
            }
            HistoryAction::Update { before, .. } => {
                self.patch_entry(
                    before.id,
                    &TransactionPatch::from(before),
                    MutationOrigin::Undo,
                );
            }
        }
        self.redo_stack.push(action);
        true
    }

    /// Re-applies the most recently undone action. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        debug!(scenario = %self.scenario_id, kind = %action.kind(), "redo");
        self.undo_stack.push(action.clone());
        match action {
            HistoryAction::Add { transaction } => {
                self.insert_entry(transaction, None, MutationOrigin::Redo);
            }
            HistoryAction::BulkAdd { transactions } => {
                for txn in transactions {
                    self.insert_entry(txn, None, MutationOrigin::Redo);
                }
            }
            HistoryAction::Delete { transaction, .. } => {
                self.remove_entry(transaction.id, MutationOrigin::Redo);
            }
            HistoryAction::Update { after, .. } => {
                self.patch_entry(after.id, &TransactionPatch::from(&after), MutationOrigin::Redo);
            }
        }
        true
    }

    /// Clears the collection and both stacks.
    pub fn reset(&mut self) {
        self.transactions.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.revision += 1;
        debug!(scenario = %self.scenario_id, "reset");
        self.notify(MutationOrigin::Reset, Change::Cleared);
    }

    /// Loads a snapshot as the current collection without touching history.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.revision += 1;
        debug!(
            scenario = %self.scenario_id,
            count = self.transactions.len(),
            "collection replaced"
        );
        self.notify(MutationOrigin::Restore, Change::Replaced);
    }

    /// Copies the collection into a new store for `scenario_id`, giving every
    /// transaction a fresh id. History and observers are not carried over.
    pub fn fork(&self, scenario_id: Uuid) -> TransactionStore {
        let mut forked = TransactionStore::with_capacity(scenario_id, self.undo_stack.capacity())
            .with_id_generator(Arc::clone(&self.ids));
        forked.transactions = self
            .transactions
            .iter()
            .map(|txn| Transaction {
                id: self.ids.next_id(),
                ..txn.clone()
            })
            .collect();
        forked
    }

    fn materialize(&self, draft: TransactionDraft) -> Transaction {
        let id = draft.id.unwrap_or_else(|| self.ids.next_id());
        draft.into_transaction(id)
    }

    fn record(&mut self, action: HistoryAction) {
        debug!(scenario = %self.scenario_id, kind = %action.kind(), "recorded");
        self.undo_stack.push(action);
        self.redo_stack.clear();
    }

    /// Re-reads added transactions from the live collection so redo replays
    /// their latest state rather than the snapshot taken at add time.
    fn refresh_added(&self, action: HistoryAction) -> HistoryAction {
        match action {
            HistoryAction::Add { transaction } => HistoryAction::Add {
                transaction: self
                    .transaction(transaction.id)
                    .cloned()
                    .unwrap_or(transaction),
            },
            HistoryAction::BulkAdd { transactions } => HistoryAction::BulkAdd {
                transactions: transactions
                    .into_iter()
                    .map(|txn| self.transaction(txn.id).cloned().unwrap_or(txn))
                    .collect(),
            },
            other => other,
        }
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.transactions.iter().position(|txn| txn.id == id)
    }

    /// Inserts `txn` at `at` (clamped) or appends it. An id that is already
    /// present is overwritten in place and reported as an update.
    fn insert_entry(&mut self, txn: Transaction, at: Option<usize>, origin: MutationOrigin) {
        if let Some(existing) = self.position(txn.id) {
            warn!(
                scenario = %self.scenario_id,
                id = %txn.id,
                "transaction already present, replacing in place"
            );
            let before = std::mem::replace(&mut self.transactions[existing], txn.clone());
            self.revision += 1;
            debug!(scenario = %self.scenario_id, ?origin, txn = %txn.display_label(), "updated");
            self.notify(
                origin,
                Change::Updated {
                    before: &before,
                    after: &txn,
                },
            );
            return;
        }
        let index = at
            .unwrap_or(self.transactions.len())
            .min(self.transactions.len());
        self.transactions.insert(index, txn.clone());
        self.revision += 1;
        debug!(scenario = %self.scenario_id, ?origin, txn = %txn.display_label(), "added");
        self.notify(origin, Change::Added(&txn));
    }

    fn patch_entry(
        &mut self,
        id: Uuid,
        patch: &TransactionPatch,
        origin: MutationOrigin,
    ) -> Option<(Transaction, Transaction)> {
        let Some(index) = self.position(id) else {
            debug!(scenario = %self.scenario_id, %id, ?origin, "update skipped, unknown id");
            return None;
        };
        let before = self.transactions[index].clone();
        let after = patch.merged(&before);
        self.transactions[index] = after.clone();
        self.revision += 1;
        debug!(scenario = %self.scenario_id, ?origin, txn = %after.display_label(), "updated");
        self.notify(
            origin,
            Change::Updated {
                before: &before,
                after: &after,
            },
        );
        Some((before, after))
    }

    fn remove_entry(&mut self, id: Uuid, origin: MutationOrigin) -> Option<(Transaction, usize)> {
        let Some(index) = self.position(id) else {
            debug!(scenario = %self.scenario_id, %id, ?origin, "delete skipped, unknown id");
            return None;
        };
        let removed = self.transactions.remove(index);
        self.revision += 1;
        debug!(scenario = %self.scenario_id, ?origin, txn = %removed.display_label(), "deleted");
        self.notify(origin, Change::Deleted(&removed));
        Some((removed, index))
    }

    fn notify(&self, origin: MutationOrigin, change: Change<'_>) {
        if self.observers.is_empty() {
            return;
        }
        let event = MutationEvent {
            scenario_id: self.scenario_id,
            revision: self.revision,
            origin,
            change,
            transactions: &self.transactions,
        };
        for observer in &self.observers {
            if let Err(err) = observer.on_mutation(&event) {
                warn!(
                    scenario = %self.scenario_id,
                    "mutation observer failed: {}", err
                );
            }
        }
    }
}

impl fmt::Debug for TransactionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionStore")
            .field("scenario_id", &self.scenario_id)
            .field("instance", &self.instance)
            .field("transactions", &self.transactions)
            .field("undo_stack", &self.undo_stack.len())
            .field("redo_stack", &self.redo_stack.len())
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn caller_origin(mode: HistoryMode) -> MutationOrigin {
    match mode {
        HistoryMode::Record => MutationOrigin::Direct,
        HistoryMode::Skip => MutationOrigin::Untracked,
    }
}
