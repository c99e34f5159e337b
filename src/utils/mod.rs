pub mod build_info;

use std::{env, path::PathBuf, sync::Once};

use flowplan_config::Config;

const HOME_ENV: &str = "FLOWPLAN_HOME";
const SCENARIOS_DIR: &str = "scenarios";

static TRACING_INIT: Once = Once::new();

/// Installs the global `fmt` subscriber. `RUST_LOG` takes precedence over
/// `default_filter`. Later calls, or a subscriber installed elsewhere, are ignored.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Returns the application data directory: `$FLOWPLAN_HOME` when set,
/// otherwise the default from [`Config::resolve_data_root`].
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    Config::default().resolve_data_root()
}

/// Directory holding scenario snapshots under `root`.
pub fn scenarios_dir(root: PathBuf) -> PathBuf {
    root.join(SCENARIOS_DIR)
}
