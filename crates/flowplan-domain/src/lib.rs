//! flowplan-domain
//!
//! Pure domain models (YearMonth, Transaction, HistoryAction, Scenario, etc.).
//! No I/O, no storage. Only data types and core enums.

pub mod common;
pub mod history;
pub mod month;
pub mod projection;
pub mod scenario;
pub mod transaction;

pub use common::*;
pub use history::*;
pub use month::*;
pub use projection::*;
pub use scenario::*;
pub use transaction::*;
