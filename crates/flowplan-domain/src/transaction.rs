//! Domain models for planned cash movements.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, month::YearMonth};

/// A single planned cash movement.
///
/// `amount` is a magnitude; the sign is carried by `direction`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub label: String,
    pub amount: f64,
    pub direction: Direction,
    pub recurrence: Recurrence,
    /// Month a one-off applies to. Recorded but not consulted for monthly entries.
    pub month: YearMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        label: impl Into<String>,
        amount: f64,
        direction: Direction,
        recurrence: Recurrence,
        month: YearMonth,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            amount,
            direction,
            recurrence,
            month,
            category_id: None,
        }
    }

    /// Whether this transaction contributes to `month` in a projection.
    ///
    /// Monthly entries apply to every projected month regardless of their own
    /// `month`, including months before it.
    pub fn applies_to(&self, month: YearMonth) -> bool {
        match self.recurrence {
            Recurrence::Monthly => true,
            Recurrence::None => self.month == month,
        }
    }

    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "{} [{} {} {:.2}]",
            self.label, self.recurrence, self.direction, self.amount
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    /// Applies the direction's sign to a magnitude.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Direction::Income => amount,
            Direction::Expense => -amount,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Income => "income",
            Direction::Expense => "expense",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// Applies to every month of the projected horizon.
    Monthly,
    /// Applies once, in the transaction's own month.
    #[default]
    None,
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recurrence::Monthly => "monthly",
            Recurrence::None => "one-off",
        };
        f.write_str(label)
    }
}

/// Payload accepted when adding a transaction.
///
/// `id` is only set when replaying a previously recorded transaction so the
/// original identifier survives undo/redo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub label: String,
    pub amount: f64,
    pub direction: Direction,
    #[serde(default)]
    pub recurrence: Recurrence,
    pub month: YearMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl TransactionDraft {
    pub fn new(
        label: impl Into<String>,
        amount: f64,
        direction: Direction,
        recurrence: Recurrence,
        month: YearMonth,
    ) -> Self {
        Self {
            id: None,
            label: label.into(),
            amount,
            direction,
            recurrence,
            month,
            category_id: None,
        }
    }

    pub fn monthly(label: impl Into<String>, amount: f64, direction: Direction, month: YearMonth) -> Self {
        Self::new(label, amount, direction, Recurrence::Monthly, month)
    }

    pub fn one_off(label: impl Into<String>, amount: f64, direction: Direction, month: YearMonth) -> Self {
        Self::new(label, amount, direction, Recurrence::None, month)
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Materialises the draft using `id` when the draft carries none.
    pub fn into_transaction(self, id: Uuid) -> Transaction {
        Transaction {
            id: self.id.unwrap_or(id),
            label: self.label,
            amount: self.amount,
            direction: self.direction,
            recurrence: self.recurrence,
            month: self.month,
            category_id: self.category_id,
        }
    }
}

impl From<Transaction> for TransactionDraft {
    fn from(txn: Transaction) -> Self {
        Self {
            id: Some(txn.id),
            label: txn.label,
            amount: txn.amount,
            direction: txn.direction,
            recurrence: txn.recurrence,
            month: txn.month,
            category_id: txn.category_id,
        }
    }
}

/// Sparse set of fields merged over an existing transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<YearMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Uuid>>,
}

impl TransactionPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.amount.is_none()
            && self.direction.is_none()
            && self.recurrence.is_none()
            && self.month.is_none()
            && self.category_id.is_none()
    }

    /// Overwrites every field present in the patch. The id is never touched.
    pub fn apply_to(&self, txn: &mut Transaction) {
        if let Some(label) = &self.label {
            txn.label = label.clone();
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(direction) = self.direction {
            txn.direction = direction;
        }
        if let Some(recurrence) = self.recurrence {
            txn.recurrence = recurrence;
        }
        if let Some(month) = self.month {
            txn.month = month;
        }
        if let Some(category_id) = self.category_id {
            txn.category_id = category_id;
        }
    }

    /// Returns `txn` with the patch merged over it.
    pub fn merged(&self, txn: &Transaction) -> Transaction {
        let mut merged = txn.clone();
        self.apply_to(&mut merged);
        merged
    }
}

impl From<&Transaction> for TransactionPatch {
    /// A patch that restores every field of `txn`.
    fn from(txn: &Transaction) -> Self {
        Self {
            label: Some(txn.label.clone()),
            amount: Some(txn.amount),
            direction: Some(txn.direction),
            recurrence: Some(txn.recurrence),
            month: Some(txn.month),
            category_id: Some(txn.category_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(raw: &str) -> YearMonth {
        raw.parse().unwrap()
    }

    #[test]
    fn monthly_applies_to_every_month() {
        let txn = Transaction::new("Salary", 100.0, Direction::Income, Recurrence::Monthly, ym("2030-01"));
        assert!(txn.applies_to(ym("2024-01")));
        assert!(txn.applies_to(ym("2031-07")));
    }

    #[test]
    fn one_off_applies_only_to_its_month() {
        let txn = Transaction::new("Car", 50.0, Direction::Expense, Recurrence::None, ym("2024-06"));
        assert!(txn.applies_to(ym("2024-06")));
        assert!(!txn.applies_to(ym("2024-05")));
        assert_eq!(txn.signed_amount(), -50.0);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let original = Transaction::new("Rent", 800.0, Direction::Expense, Recurrence::Monthly, ym("2024-01"));
        let patch = TransactionPatch {
            amount: Some(850.0),
            category_id: Some(Some(Uuid::nil())),
            ..TransactionPatch::default()
        };
        let merged = patch.merged(&original);
        assert_eq!(merged.id, original.id);
        assert_eq!(merged.label, "Rent");
        assert_eq!(merged.amount, 850.0);
        assert_eq!(merged.category_id, Some(Uuid::nil()));
    }

    #[test]
    fn snapshot_patch_restores_every_field() {
        let before = Transaction::new("Gym", 30.0, Direction::Expense, Recurrence::Monthly, ym("2024-01"));
        let mut after = before.clone();
        after.label = "Climbing".into();
        after.amount = 45.0;
        after.recurrence = Recurrence::None;
        after.category_id = Some(Uuid::new_v4());

        TransactionPatch::from(&before).apply_to(&mut after);
        assert_eq!(after, before);
    }

    #[test]
    fn draft_keeps_replayed_id() {
        let txn = Transaction::new("Bonus", 150.0, Direction::Income, Recurrence::None, ym("2024-04"));
        let draft = TransactionDraft::from(txn.clone());
        assert_eq!(draft.clone().into_transaction(Uuid::new_v4()), txn);

        let fresh = TransactionDraft::one_off("Gift", 20.0, Direction::Income, ym("2024-04"));
        let id = Uuid::new_v4();
        assert_eq!(fresh.into_transaction(id).id, id);
    }

    #[test]
    fn enums_serialize_lowercase() {
        let json = serde_json::to_string(&TransactionDraft::monthly(
            "Salary",
            1000.0,
            Direction::Income,
            ym("2024-01"),
        ))
        .unwrap();
        assert!(json.contains("\"direction\":\"income\""));
        assert!(json.contains("\"recurrence\":\"monthly\""));
        assert!(json.contains("\"month\":\"2024-01\""));
        assert!(!json.contains("\"id\""));
    }
}
