//! flowplan-storage-json
//!
//! JSON-on-disk persistence for scenario snapshots, plus an observer that
//! autosaves a scenario after every change to its transaction store.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use flowplan_core::{storage::ScenarioStorage, CoreError, MutationEvent, MutationObserver};
use flowplan_domain::{Planification, Scenario, ScenarioSnapshot};
use tracing::{debug, warn};
use uuid::Uuid;

const SNAPSHOT_EXTENSION: &str = "json";
const PLANIFICATIONS_FILE: &str = "planifications.json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence: one `<scenario-id>.json` per scenario.
#[derive(Debug, Clone)]
pub struct JsonScenarioStorage {
    scenarios_dir: PathBuf,
}

impl JsonScenarioStorage {
    pub fn new(scenarios_dir: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&scenarios_dir)?;
        Ok(Self { scenarios_dir })
    }

    pub fn scenarios_dir(&self) -> &Path {
        &self.scenarios_dir
    }

    pub fn snapshot_path(&self, scenario_id: Uuid) -> PathBuf {
        self.scenarios_dir
            .join(format!("{}.{}", scenario_id, SNAPSHOT_EXTENSION))
    }

    /// Reads every stored snapshot header, sorted by scenario name.
    pub fn list_snapshot_metadata(&self) -> Result<Vec<SnapshotMetadata>, CoreError> {
        let mut entries = Vec::new();
        for id in self.list_snapshots()? {
            let snapshot = self.load_snapshot(id)?;
            entries.push(SnapshotMetadata {
                scenario_id: id,
                name: snapshot.scenario.name.clone(),
                path: self.snapshot_path(id),
                schema_version: snapshot.schema_version,
                transaction_count: snapshot.transactions.len(),
                saved_at: snapshot.saved_at,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn save_planifications(&self, planifications: &[Planification]) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(planifications)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        write_replacing(&self.scenarios_dir.join(PLANIFICATIONS_FILE), &json)
    }

    pub fn load_planifications(&self) -> Result<Vec<Planification>, CoreError> {
        let path = self.scenarios_dir.join(PLANIFICATIONS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
    }
}

impl ScenarioStorage for JsonScenarioStorage {
    fn save_snapshot(&self, snapshot: &ScenarioSnapshot) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let path = self.snapshot_path(snapshot.scenario.id);
        write_replacing(&path, &json)?;
        debug!(
            scenario = %snapshot.scenario.id,
            path = %path.display(),
            transactions = snapshot.transactions.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn load_snapshot(&self, scenario_id: Uuid) -> Result<ScenarioSnapshot, CoreError> {
        let path = self.snapshot_path(scenario_id);
        if !path.exists() {
            return Err(CoreError::ScenarioNotFound(scenario_id));
        }
        load_snapshot_from_path(&path)
    }

    fn list_snapshots(&self) -> Result<Vec<Uuid>, CoreError> {
        if !self.scenarios_dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.scenarios_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match Uuid::parse_str(stem) {
                Ok(id) => ids.push(id),
                Err(_) => debug!(path = %path.display(), "ignoring non-snapshot file"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete_snapshot(&self, scenario_id: Uuid) -> Result<(), CoreError> {
        let path = self.snapshot_path(scenario_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Loads a snapshot from an arbitrary path on disk.
pub fn load_snapshot_from_path(path: &Path) -> Result<ScenarioSnapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub scenario_id: Uuid,
    pub name: String,
    pub path: PathBuf,
    pub schema_version: u8,
    pub transaction_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Persists the scenario's snapshot whenever its store changes.
///
/// Scenario metadata is held here because mutation events only carry the
/// transaction collection; call [`AutosaveObserver::set_scenario`] after
/// renaming or re-parameterising the scenario.
pub struct AutosaveObserver {
    storage: Arc<dyn ScenarioStorage>,
    scenario: Mutex<Scenario>,
}

impl AutosaveObserver {
    pub fn new(storage: Arc<dyn ScenarioStorage>, scenario: Scenario) -> Self {
        Self {
            storage,
            scenario: Mutex::new(scenario),
        }
    }

    pub fn set_scenario(&self, scenario: Scenario) -> Result<(), CoreError> {
        let mut guard = self
            .scenario
            .lock()
            .map_err(|_| CoreError::Storage("autosave scenario lock poisoned".into()))?;
        *guard = scenario;
        Ok(())
    }
}

impl MutationObserver for AutosaveObserver {
    fn on_mutation(&self, event: &MutationEvent<'_>) -> Result<(), CoreError> {
        let scenario = self
            .scenario
            .lock()
            .map_err(|_| CoreError::Storage("autosave scenario lock poisoned".into()))?
            .clone();
        if scenario.id != event.scenario_id {
            warn!(
                expected = %scenario.id,
                received = %event.scenario_id,
                "autosave skipped, event for another scenario"
            );
            return Ok(());
        }
        let snapshot = ScenarioSnapshot::new(scenario, event.transactions.to_vec());
        self.storage.save_snapshot(&snapshot)
    }
}

fn write_replacing(path: &Path, data: &str) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
