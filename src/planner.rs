//! High-level entry point tying the workspace, configuration and JSON
//! persistence together.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use flowplan_config::{Config, ConfigManager};
use flowplan_core::{
    storage::ScenarioStorage, MonthDelta, ProjectionCache, ProjectionSummary, ScenarioWorkspace,
    SummaryService, ValidationService,
};
use flowplan_domain::{
    Horizon, MonthData, Scenario, Transaction, TransactionDraft, TransactionPatch, YearMonth,
};
use flowplan_storage_json::{AutosaveObserver, JsonScenarioStorage};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::{PlannerError, Result},
    utils,
};

/// Row of [`Planner::overview`], serializable for hosts that render lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOverview {
    pub id: Uuid,
    pub name: String,
    pub starting_month: YearMonth,
    pub horizon_months: usize,
    pub transaction_count: usize,
    pub ending_balance: f64,
    pub updated_at: DateTime<Utc>,
}

/// Owns a [`ScenarioWorkspace`] and, when opened on disk, keeps every
/// scenario autosaved as it changes.
pub struct Planner {
    config: Config,
    workspace: ScenarioWorkspace,
    cache: ProjectionCache,
    storage: Option<Arc<JsonScenarioStorage>>,
    autosave: HashMap<Uuid, Arc<AutosaveObserver>>,
}

impl Planner {
    /// Planner without persistence.
    pub fn in_memory(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            workspace: ScenarioWorkspace::with_history_capacity(config.history_capacity),
            config,
            cache: ProjectionCache::new(),
            storage: None,
            autosave: HashMap::new(),
        })
    }

    /// Opens the data directory resolved by [`utils::app_data_dir`].
    pub fn open_default() -> Result<Self> {
        Self::open(utils::app_data_dir())
    }

    /// Loads `base_dir/config/config.json` and every scenario snapshot stored
    /// under the data root. Unreadable snapshots are skipped with a warning.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let config = ConfigManager::with_base_dir(base_dir.clone())?.load()?;
        let root = config.data_root.clone().unwrap_or(base_dir);
        let storage = Arc::new(JsonScenarioStorage::new(utils::scenarios_dir(root))?);

        let mut planner = Self::in_memory(config)?;
        for planification in storage.load_planifications()? {
            planner.workspace.restore_planification(planification);
        }
        for id in storage.list_snapshots()? {
            let restored = storage
                .load_snapshot(id)
                .and_then(|snapshot| planner.workspace.restore(snapshot));
            if let Err(err) = restored {
                warn!(scenario = %id, "skipping unreadable snapshot: {}", err);
            }
        }
        planner.storage = Some(storage);

        let ids: Vec<Uuid> = planner.workspace.scenarios().map(|s| s.id).collect();
        for id in &ids {
            planner.attach_autosave(*id)?;
        }
        info!(
            scenarios = ids.len(),
            dir = ?planner.data_dir(),
            "planner opened"
        );
        Ok(planner)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &ScenarioWorkspace {
        &self.workspace
    }

    /// Directory holding scenario snapshots, if the planner is persistent.
    pub fn data_dir(&self) -> Option<&Path> {
        self.storage.as_deref().map(JsonScenarioStorage::scenarios_dir)
    }

    pub fn create_planification(&mut self, name: impl Into<String>) -> Result<Uuid> {
        let id = self.workspace.create_planification(name);
        self.persist_planifications()?;
        Ok(id)
    }

    /// Creates a scenario using the configured starting balance and horizon.
    pub fn create_scenario(
        &mut self,
        name: impl Into<String>,
        starting_month: YearMonth,
    ) -> Result<Uuid> {
        let balance = self.config.default_starting_balance;
        let horizon = Horizon::from(self.config.default_horizon_months);
        self.create_scenario_with(None, name, balance, starting_month, horizon)
    }

    pub fn create_scenario_with(
        &mut self,
        planification_id: Option<Uuid>,
        name: impl Into<String>,
        starting_balance: f64,
        starting_month: YearMonth,
        horizon: Horizon,
    ) -> Result<Uuid> {
        if !starting_balance.is_finite() {
            return Err(PlannerError::InvalidInput(
                "starting balance must be a finite number".into(),
            ));
        }
        let id = self.workspace.create_scenario(
            planification_id,
            name,
            starting_balance,
            starting_month,
            horizon,
        )?;
        self.attach_autosave(id)?;
        self.persist(id)?;
        Ok(id)
    }

    /// Branches a scenario: same parameters and transactions, fresh ids, no history.
    pub fn duplicate_scenario(&mut self, id: Uuid, name: impl Into<String>) -> Result<Uuid> {
        let copy = self.workspace.duplicate_scenario(id, name)?;
        self.attach_autosave(copy)?;
        self.persist(copy)?;
        Ok(copy)
    }

    pub fn rename_scenario(&mut self, id: Uuid, name: impl Into<String>) -> Result<()> {
        self.workspace.rename_scenario(id, name)?;
        self.sync_autosave(id)?;
        self.persist(id)
    }

    pub fn set_parameters(
        &mut self,
        id: Uuid,
        starting_balance: f64,
        starting_month: YearMonth,
        horizon: Horizon,
    ) -> Result<()> {
        if !starting_balance.is_finite() {
            return Err(PlannerError::InvalidInput(
                "starting balance must be a finite number".into(),
            ));
        }
        self.workspace
            .set_parameters(id, starting_balance, starting_month, horizon)?;
        self.sync_autosave(id)?;
        self.persist(id)
    }

    pub fn remove_scenario(&mut self, id: Uuid) -> Result<Scenario> {
        let removed = self.workspace.remove_scenario(id)?;
        self.autosave.remove(&id);
        self.cache.invalidate(id);
        if let Some(storage) = &self.storage {
            storage.delete_snapshot(id)?;
        }
        Ok(removed)
    }

    pub fn scenario(&self, id: Uuid) -> Result<&Scenario> {
        Ok(self.workspace.scenario(id)?)
    }

    pub fn transactions(&self, scenario_id: Uuid) -> Result<&[Transaction]> {
        Ok(self.workspace.store(scenario_id)?.transactions())
    }

    /// Validated add; the draft is rejected before anything is recorded.
    pub fn add_transaction(&mut self, scenario_id: Uuid, draft: TransactionDraft) -> Result<Uuid> {
        Ok(self
            .workspace
            .store_mut(scenario_id)?
            .try_add_transaction(draft)?)
    }

    /// Validates every draft first, then adds them as one undoable step.
    pub fn add_transactions(
        &mut self,
        scenario_id: Uuid,
        drafts: Vec<TransactionDraft>,
    ) -> Result<Vec<Uuid>> {
        for draft in &drafts {
            ValidationService::check_draft(draft)?;
        }
        Ok(self
            .workspace
            .store_mut(scenario_id)?
            .add_transactions(drafts))
    }

    pub fn update_transaction(
        &mut self,
        scenario_id: Uuid,
        transaction_id: Uuid,
        patch: TransactionPatch,
    ) -> Result<()> {
        Ok(self
            .workspace
            .store_mut(scenario_id)?
            .try_update_transaction(transaction_id, patch)?)
    }

    pub fn delete_transaction(&mut self, scenario_id: Uuid, transaction_id: Uuid) -> Result<()> {
        Ok(self
            .workspace
            .store_mut(scenario_id)?
            .try_delete_transaction(transaction_id)?)
    }

    /// Returns `false` when the scenario has nothing to undo.
    pub fn undo(&mut self, scenario_id: Uuid) -> Result<bool> {
        Ok(self.workspace.store_mut(scenario_id)?.undo())
    }

    /// Returns `false` when the scenario has nothing to redo.
    pub fn redo(&mut self, scenario_id: Uuid) -> Result<bool> {
        Ok(self.workspace.store_mut(scenario_id)?.redo())
    }

    /// Clears the scenario's transactions and history.
    pub fn reset(&mut self, scenario_id: Uuid) -> Result<()> {
        self.workspace.store_mut(scenario_id)?.reset();
        Ok(())
    }

    pub fn project(&mut self, scenario_id: Uuid) -> Result<Vec<MonthData>> {
        let (scenario, store) = self.workspace.parts(scenario_id)?;
        Ok(self.cache.get_or_compute(scenario, store).to_vec())
    }

    pub fn summary(&mut self, scenario_id: Uuid) -> Result<ProjectionSummary> {
        let rows = self.project(scenario_id)?;
        let starting_balance = self.workspace.scenario(scenario_id)?.starting_balance;
        Ok(SummaryService::summarize(starting_balance, &rows))
    }

    pub fn compare(&mut self, baseline: Uuid, candidate: Uuid) -> Result<Vec<MonthDelta>> {
        let base_rows = self.project(baseline)?;
        let candidate_rows = self.project(candidate)?;
        Ok(SummaryService::compare(&base_rows, &candidate_rows))
    }

    /// Projection rows as pretty-printed JSON.
    pub fn export_projection(&mut self, scenario_id: Uuid) -> Result<String> {
        let rows = self.project(scenario_id)?;
        Ok(serde_json::to_string_pretty(&rows)?)
    }

    /// One row per scenario, sorted by name.
    pub fn overview(&mut self) -> Result<Vec<ScenarioOverview>> {
        let ids: Vec<Uuid> = self.workspace.scenarios().map(|s| s.id).collect();
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let ending_balance = self.summary(id)?.ending_balance;
            let (scenario, store) = self.workspace.parts(id)?;
            rows.push(ScenarioOverview {
                id,
                name: scenario.name.clone(),
                starting_month: scenario.starting_month,
                horizon_months: scenario.horizon.months(),
                transaction_count: store.transactions().len(),
                ending_balance,
                updated_at: scenario.updated_at,
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Writes every scenario snapshot and the planification list. Returns the
    /// number of scenarios written.
    pub fn save_all(&self) -> Result<usize> {
        let storage = self.storage.as_ref().ok_or(PlannerError::NotPersistent)?;
        let mut written = 0;
        for scenario in self.workspace.scenarios() {
            storage.save_snapshot(&self.workspace.snapshot(scenario.id)?)?;
            written += 1;
        }
        storage.save_planifications(self.workspace.planifications())?;
        info!(scenarios = written, "planner saved");
        Ok(written)
    }

    fn attach_autosave(&mut self, id: Uuid) -> Result<()> {
        let Some(storage) = self.storage.clone() else {
            return Ok(());
        };
        let scenario = self.workspace.scenario(id)?.clone();
        let observer = Arc::new(AutosaveObserver::new(storage, scenario));
        self.workspace.store_mut(id)?.subscribe(observer.clone());
        self.autosave.insert(id, observer);
        Ok(())
    }

    fn sync_autosave(&self, id: Uuid) -> Result<()> {
        if let Some(observer) = self.autosave.get(&id) {
            observer.set_scenario(self.workspace.scenario(id)?.clone())?;
        }
        Ok(())
    }

    fn persist(&self, id: Uuid) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.save_snapshot(&self.workspace.snapshot(id)?)?;
        }
        Ok(())
    }

    fn persist_planifications(&self) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.save_planifications(self.workspace.planifications())?;
        }
        Ok(())
    }
}
