//! Planifications and scenarios, each owning its own transaction store.

use std::sync::Arc;

use flowplan_domain::{
    Horizon, MonthData, Planification, Scenario, ScenarioSnapshot, YearMonth,
    CURRENT_SCHEMA_VERSION,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    history::HISTORY_LIMIT,
    id::{IdGenerator, UuidGenerator},
    projection_service::ProjectionService,
    summary_service::{MonthDelta, ProjectionSummary, SummaryService},
    transaction_store::TransactionStore,
    CoreError,
};

struct ScenarioEntry {
    scenario: Scenario,
    store: TransactionStore,
}

/// Holds any number of scenarios side by side, so they can be edited and
/// compared without a shared "current scenario".
pub struct ScenarioWorkspace {
    planifications: Vec<Planification>,
    entries: Vec<ScenarioEntry>,
    history_capacity: usize,
    ids: Arc<dyn IdGenerator>,
}

impl ScenarioWorkspace {
    pub fn new() -> Self {
        Self::with_history_capacity(HISTORY_LIMIT)
    }

    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            planifications: Vec::new(),
            entries: Vec::new(),
            history_capacity,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Uses `ids` for transactions created in stores opened after this call.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn create_planification(&mut self, name: impl Into<String>) -> Uuid {
        let planification = Planification::new(name);
        let id = planification.id;
        self.planifications.push(planification);
        id
    }

    /// Re-registers a persisted planification, replacing one with the same id.
    pub fn restore_planification(&mut self, planification: Planification) {
        match self
            .planifications
            .iter_mut()
            .find(|plan| plan.id == planification.id)
        {
            Some(existing) => *existing = planification,
            None => self.planifications.push(planification),
        }
    }

    pub fn planification(&self, id: Uuid) -> Option<&Planification> {
        self.planifications.iter().find(|plan| plan.id == id)
    }

    pub fn planifications(&self) -> &[Planification] {
        &self.planifications
    }

    pub fn rename_planification(
        &mut self,
        id: Uuid,
        name: impl Into<String>,
    ) -> Result<(), CoreError> {
        let plan = self
            .planifications
            .iter_mut()
            .find(|plan| plan.id == id)
            .ok_or(CoreError::PlanificationNotFound(id))?;
        plan.name = name.into();
        plan.touch();
        Ok(())
    }

    pub fn create_scenario(
        &mut self,
        planification_id: Option<Uuid>,
        name: impl Into<String>,
        starting_balance: f64,
        starting_month: YearMonth,
        horizon: Horizon,
    ) -> Result<Uuid, CoreError> {
        if let Some(plan_id) = planification_id {
            self.ensure_planification(plan_id)?;
        }
        check_window(starting_month, horizon)?;
        let mut scenario = Scenario::new(name, starting_balance, starting_month, horizon);
        scenario.planification_id = planification_id;
        let id = scenario.id;
        debug!(scenario = %id, name = %scenario.name, "scenario created");
        let store = self.open_store(id);
        self.entries.push(ScenarioEntry { scenario, store });
        Ok(id)
    }

    /// Branches `id` into a new scenario with copied transactions and empty history.
    pub fn duplicate_scenario(&mut self, id: Uuid, name: impl Into<String>) -> Result<Uuid, CoreError> {
        let source = self.entry(id)?;
        let mut scenario = Scenario::new(
            name,
            source.scenario.starting_balance,
            source.scenario.starting_month,
            source.scenario.horizon,
        );
        scenario.planification_id = source.scenario.planification_id;
        let new_id = scenario.id;
        let store = source.store.fork(new_id);
        debug!(source = %id, scenario = %new_id, "scenario duplicated");
        self.entries.push(ScenarioEntry { scenario, store });
        Ok(new_id)
    }

    pub fn rename_scenario(&mut self, id: Uuid, name: impl Into<String>) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        entry.scenario.name = name.into();
        entry.scenario.touch();
        Ok(())
    }

    pub fn set_parameters(
        &mut self,
        id: Uuid,
        starting_balance: f64,
        starting_month: YearMonth,
        horizon: Horizon,
    ) -> Result<(), CoreError> {
        check_window(starting_month, horizon)?;
        let entry = self.entry_mut(id)?;
        entry.scenario.starting_balance = starting_balance;
        entry.scenario.starting_month = starting_month;
        entry.scenario.horizon = horizon;
        entry.scenario.touch();
        Ok(())
    }

    pub fn remove_scenario(&mut self, id: Uuid) -> Result<Scenario, CoreError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.scenario.id == id)
            .ok_or(CoreError::ScenarioNotFound(id))?;
        Ok(self.entries.remove(index).scenario)
    }

    pub fn scenario(&self, id: Uuid) -> Result<&Scenario, CoreError> {
        self.entry(id).map(|entry| &entry.scenario)
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.entries.iter().map(|entry| &entry.scenario)
    }

    pub fn scenarios_in(&self, planification_id: Uuid) -> impl Iterator<Item = &Scenario> {
        self.scenarios()
            .filter(move |scenario| scenario.planification_id == Some(planification_id))
    }

    pub fn store(&self, id: Uuid) -> Result<&TransactionStore, CoreError> {
        self.entry(id).map(|entry| &entry.store)
    }

    pub fn store_mut(&mut self, id: Uuid) -> Result<&mut TransactionStore, CoreError> {
        self.entry_mut(id).map(|entry| &mut entry.store)
    }

    /// Scenario metadata and its store, borrowed together.
    pub fn parts(&self, id: Uuid) -> Result<(&Scenario, &TransactionStore), CoreError> {
        self.entry(id).map(|entry| (&entry.scenario, &entry.store))
    }

    pub fn project(&self, id: Uuid) -> Result<Vec<MonthData>, CoreError> {
        let entry = self.entry(id)?;
        Ok(ProjectionService::for_scenario(
            &entry.scenario,
            entry.store.transactions(),
        ))
    }

    pub fn summary(&self, id: Uuid) -> Result<ProjectionSummary, CoreError> {
        let rows = self.project(id)?;
        let scenario = self.scenario(id)?;
        Ok(SummaryService::summarize(scenario.starting_balance, &rows))
    }

    /// Month-by-month difference of `candidate` relative to `baseline`.
    pub fn compare(&self, baseline: Uuid, candidate: Uuid) -> Result<Vec<MonthDelta>, CoreError> {
        let base_rows = self.project(baseline)?;
        let candidate_rows = self.project(candidate)?;
        Ok(SummaryService::compare(&base_rows, &candidate_rows))
    }

    pub fn snapshot(&self, id: Uuid) -> Result<ScenarioSnapshot, CoreError> {
        let entry = self.entry(id)?;
        Ok(ScenarioSnapshot::new(
            entry.scenario.clone(),
            entry.store.transactions().to_vec(),
        ))
    }

    /// Loads a snapshot, replacing the collection of an existing scenario with
    /// the same id or opening a new one. History is left untouched.
    pub fn restore(&mut self, snapshot: ScenarioSnapshot) -> Result<Uuid, CoreError> {
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(CoreError::InvalidOperation(format!(
                "snapshot schema version {} is newer than supported {}",
                snapshot.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        let ScenarioSnapshot {
            scenario,
            transactions,
            ..
        } = snapshot;
        let id = scenario.id;
        info!(scenario = %id, count = transactions.len(), "restoring scenario snapshot");
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.scenario.id == id) {
            entry.scenario = scenario;
            entry.store.replace_all(transactions);
        } else {
            let mut store = self.open_store(id);
            store.replace_all(transactions);
            self.entries.push(ScenarioEntry { scenario, store });
        }
        Ok(id)
    }

    fn open_store(&self, id: Uuid) -> TransactionStore {
        TransactionStore::with_capacity(id, self.history_capacity)
            .with_id_generator(Arc::clone(&self.ids))
    }

    fn ensure_planification(&self, id: Uuid) -> Result<(), CoreError> {
        self.planification(id)
            .map(|_| ())
            .ok_or(CoreError::PlanificationNotFound(id))
    }

    fn entry(&self, id: Uuid) -> Result<&ScenarioEntry, CoreError> {
        self.entries
            .iter()
            .find(|entry| entry.scenario.id == id)
            .ok_or(CoreError::ScenarioNotFound(id))
    }

    fn entry_mut(&mut self, id: Uuid) -> Result<&mut ScenarioEntry, CoreError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.scenario.id == id)
            .ok_or(CoreError::ScenarioNotFound(id))
    }
}

impl Default for ScenarioWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects windows whose last month would fall after `9999-12`.
fn check_window(starting_month: YearMonth, horizon: Horizon) -> Result<(), CoreError> {
    let last_offset = u32::try_from(horizon.months().saturating_sub(1)).ok();
    match last_offset.and_then(|offset| starting_month.checked_add_months(offset)) {
        Some(_) => Ok(()),
        None => Err(CoreError::InvalidOperation(format!(
            "a {}-month horizon from {} runs past {}",
            horizon.months(),
            starting_month,
            YearMonth::MAX
        ))),
    }
}
