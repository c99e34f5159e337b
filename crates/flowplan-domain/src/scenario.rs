//! Planifications, scenarios, and their persisted snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, month::YearMonth, projection::Horizon, transaction::Transaction};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Top-level named plan grouping scenarios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Planification {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Planification {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A named branch of transactions plus the parameters it is projected with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planification_id: Option<Uuid>,
    pub name: String,
    pub starting_balance: f64,
    pub starting_month: YearMonth,
    #[serde(default)]
    pub horizon: Horizon,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        starting_balance: f64,
        starting_month: YearMonth,
        horizon: Horizon,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            planification_id: None,
            name: name.into(),
            starting_balance,
            starting_month,
            horizon,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Displayable for Scenario {
    fn display_label(&self) -> String {
        format!(
            "{} (from {}, {})",
            self.name, self.starting_month, self.horizon
        )
    }
}

/// The persisted unit: scenario metadata plus its transaction collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSnapshot {
    #[serde(default = "ScenarioSnapshot::schema_version_default")]
    pub schema_version: u8,
    pub scenario: Scenario,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub saved_at: DateTime<Utc>,
}

impl ScenarioSnapshot {
    pub fn new(scenario: Scenario, transactions: Vec<Transaction>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            scenario,
            transactions,
            saved_at: Utc::now(),
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
