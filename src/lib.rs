#![doc(test(attr(deny(warnings))))]

//! Flowplan projects month-by-month cashflow balances for independent
//! scenarios and keeps every transaction edit undoable.
//!
//! The root crate wires the workspace crates together: configuration,
//! tracing, JSON persistence and the [`Planner`] facade.

pub mod errors;
pub mod planner;
pub mod utils;

pub use errors::{PlannerError, Result};
pub use flowplan_config::{Config, ConfigManager};
pub use flowplan_core::{
    HistoryMode, MonthDelta, ProjectionSummary, ScenarioWorkspace, TransactionStore,
};
pub use flowplan_domain::{
    Direction, Horizon, MonthData, Recurrence, Scenario, Transaction, TransactionDraft,
    TransactionPatch, YearMonth,
};
pub use planner::{Planner, ScenarioOverview};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default log filter.
pub fn init() {
    init_with(&Config::default());
}

/// Initializes global tracing using `config.log_filter` unless `RUST_LOG` is set.
pub fn init_with(config: &Config) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(&config.log_filter);
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            "Flowplan tracing initialized."
        );
    });
}
