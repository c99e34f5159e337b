//! Invertible records of applied mutations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// One applied mutation, carrying enough state to re-apply and to invert it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryAction {
    Add { transaction: Transaction },
    Update { before: Transaction, after: Transaction },
    /// `position` is the index the transaction occupied, so undo restores order.
    Delete { transaction: Transaction, position: usize },
    BulkAdd { transactions: Vec<Transaction> },
}

impl HistoryAction {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryAction::Add { .. } => HistoryKind::Add,
            HistoryAction::Update { .. } => HistoryKind::Update,
            HistoryAction::Delete { .. } => HistoryKind::Delete,
            HistoryAction::BulkAdd { .. } => HistoryKind::BulkAdd,
        }
    }

    pub fn entity(&self) -> HistoryEntity {
        HistoryEntity::Transaction
    }

    /// State needed to re-apply a single-transaction action.
    pub fn data(&self) -> Option<&Transaction> {
        match self {
            HistoryAction::Add { transaction } | HistoryAction::Delete { transaction, .. } => {
                Some(transaction)
            }
            HistoryAction::Update { after, .. } => Some(after),
            HistoryAction::BulkAdd { .. } => None,
        }
    }

    /// State needed to undo a single-transaction action.
    pub fn inverse_data(&self) -> Option<&Transaction> {
        match self {
            HistoryAction::Add { transaction } | HistoryAction::Delete { transaction, .. } => {
                Some(transaction)
            }
            HistoryAction::Update { before, .. } => Some(before),
            HistoryAction::BulkAdd { .. } => None,
        }
    }

    /// Every transaction touched by the action.
    pub fn transactions(&self) -> Vec<&Transaction> {
        match self {
            HistoryAction::Add { transaction } | HistoryAction::Delete { transaction, .. } => {
                vec![transaction]
            }
            HistoryAction::Update { after, .. } => vec![after],
            HistoryAction::BulkAdd { transactions } => transactions.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Add,
    Update,
    Delete,
    BulkAdd,
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HistoryKind::Add => "add",
            HistoryKind::Update => "update",
            HistoryKind::Delete => "delete",
            HistoryKind::BulkAdd => "bulk_add",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEntity {
    Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Recurrence};

    fn txn(label: &str, amount: f64) -> Transaction {
        Transaction::new(
            label,
            amount,
            Direction::Expense,
            Recurrence::Monthly,
            "2024-01".parse().unwrap(),
        )
    }

    #[test]
    fn update_exposes_after_as_data_and_before_as_inverse() {
        let before = txn("Rent", 800.0);
        let mut after = before.clone();
        after.amount = 900.0;
        let action = HistoryAction::Update {
            before: before.clone(),
            after: after.clone(),
        };
        assert_eq!(action.kind(), HistoryKind::Update);
        assert_eq!(action.entity(), HistoryEntity::Transaction);
        assert_eq!(action.data(), Some(&after));
        assert_eq!(action.inverse_data(), Some(&before));
    }

    #[test]
    fn add_and_delete_use_same_payload_both_ways() {
        let t = txn("Phone", 40.0);
        let add = HistoryAction::Add {
            transaction: t.clone(),
        };
        assert_eq!(add.data(), add.inverse_data());
        let bulk = HistoryAction::BulkAdd {
            transactions: vec![t.clone(), txn("Internet", 30.0)],
        };
        assert_eq!(bulk.data(), None);
        assert_eq!(bulk.transactions().len(), 2);
    }

    #[test]
    fn serializes_with_type_tag() {
        let action = HistoryAction::Delete {
            transaction: txn("Water", 20.0),
            position: 0,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "delete");
    }
}
