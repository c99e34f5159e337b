//! flowplan-config
//!
//! Persistent planner preferences: projection defaults, history depth,
//! logging directive and data location, plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
