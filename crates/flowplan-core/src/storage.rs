use flowplan_domain::ScenarioSnapshot;
use uuid::Uuid;

use crate::CoreError;

/// Abstraction over persistence backends capable of storing scenario snapshots.
pub trait ScenarioStorage: Send + Sync {
    fn save_snapshot(&self, snapshot: &ScenarioSnapshot) -> Result<(), CoreError>;
    fn load_snapshot(&self, scenario_id: Uuid) -> Result<ScenarioSnapshot, CoreError>;
    fn list_snapshots(&self) -> Result<Vec<Uuid>, CoreError>;
    fn delete_snapshot(&self, scenario_id: Uuid) -> Result<(), CoreError>;
}
