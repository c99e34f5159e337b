//! Boundary checks for caller-supplied transaction payloads.

use flowplan_domain::{TransactionDraft, TransactionPatch};

use crate::CoreError;

/// Rejects payloads that break the projection engine's input contract.
pub struct ValidationService;

impl ValidationService {
    pub fn check_draft(draft: &TransactionDraft) -> Result<(), CoreError> {
        check_label(&draft.label)?;
        check_amount(draft.amount)
    }

    pub fn check_patch(patch: &TransactionPatch) -> Result<(), CoreError> {
        if let Some(label) = &patch.label {
            check_label(label)?;
        }
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
        }
        Ok(())
    }
}

fn check_label(label: &str) -> Result<(), CoreError> {
    if label.trim().is_empty() {
        return Err(CoreError::Validation("label must not be empty".into()));
    }
    Ok(())
}

fn check_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() {
        return Err(CoreError::Validation(format!(
            "amount {amount} is not a finite number"
        )));
    }
    if amount < 0.0 {
        return Err(CoreError::Validation(format!(
            "amount {amount} must not be negative; use the direction for sign"
        )));
    }
    Ok(())
}
