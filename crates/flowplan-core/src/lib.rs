//! flowplan-core
//!
//! Projection engine, mutation/undo-redo history, and scenario orchestration.
//! Depends on flowplan-domain. No terminal I/O, no direct storage interactions.

pub mod error;
pub mod history;
pub mod id;
pub mod observer;
pub mod projection_service;
pub mod scenario_service;
pub mod storage;
pub mod summary_service;
pub mod transaction_store;
pub mod validation;


pub use error::CoreError;
pub use history::*;
pub use id::*;
pub use observer::*;
pub use projection_service::*;
pub use scenario_service::*;
pub use summary_service::*;
pub use transaction_store::*;
pub use validation::*;
