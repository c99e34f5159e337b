use std::{path::PathBuf, sync::Mutex};

use flowplan::{Config, Planner, YearMonth};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique base directory that outlives the calling test.
pub fn temp_base_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a persistent planner backed by a fresh directory.
pub fn setup_planner() -> (Planner, PathBuf) {
    let base = temp_base_dir();
    let planner = Planner::open(base.clone()).expect("open planner in temp dir");
    (planner, base)
}

#[allow(dead_code)]
pub fn in_memory_planner() -> Planner {
    Planner::in_memory(Config::default()).expect("in-memory planner")
}

pub fn ym(token: &str) -> YearMonth {
    token.parse().expect("valid year-month")
}
