use std::result::Result as StdResult;

use flowplan_config::ConfigError;
use flowplan_core::CoreError;
use flowplan_domain::YearMonthError;
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the planner and the crates beneath it.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(Uuid),
    #[error("Planification not found: {0}")]
    PlanificationNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Planner has no storage attached")]
    NotPersistent,
}

pub type Result<T> = StdResult<T, PlannerError>;

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::StorageError(err.to_string())
    }
}

impl From<YearMonthError> for PlannerError {
    fn from(err: YearMonthError) -> Self {
        PlannerError::InvalidInput(err.to_string())
    }
}

impl From<CoreError> for PlannerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ScenarioNotFound(id) => PlannerError::ScenarioNotFound(id),
            CoreError::PlanificationNotFound(id) => PlannerError::PlanificationNotFound(id),
            CoreError::TransactionNotFound(id) => PlannerError::TransactionNotFound(id),
            CoreError::InvalidOperation(message) | CoreError::Validation(message) => {
                PlannerError::InvalidInput(message)
            }
            CoreError::Storage(message) | CoreError::Serde(message) => {
                PlannerError::StorageError(message)
            }
            CoreError::Io(err) => PlannerError::StorageError(err.to_string()),
        }
    }
}

impl From<ConfigError> for PlannerError {
    fn from(err: ConfigError) -> Self {
        PlannerError::ConfigError(err.to_string())
    }
}
