//! Marryroute - Korean wedding-planning assistant core
//!
//! Rule-based extraction of dates, regions, and per-category budgets from
//! free-form Korean input, merged incrementally into a per-user SQLite
//! profile with a regenerated summary on every commit.

pub mod commit;
pub mod error;
pub mod notes;
pub mod parser;
pub mod storage;
pub mod summary;
pub mod types;

pub use commit::{CommitOutcome, CommitPlan, Planner, UpdateOutcome};
pub use error::{MarryError, Result};
pub use parser::Parser;
pub use storage::Storage;
pub use summary::render_summary;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
