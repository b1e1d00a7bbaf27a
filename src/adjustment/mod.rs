//! Percentage adjustments for salary components.
//!
//! Operators store a percentage per (month, component); generation scales
//! the matching slip amounts by `1 + percentage / 100`. Overrides are
//! persisted through an [`OverrideRepository`], either in memory or in
//! SQLite, and replaced per component as one atomic unit.

mod repository;
mod sqlite;
mod store;

pub use repository::{InMemoryOverrideRepository, OverrideRepository};
pub use sqlite::SqliteOverrideRepository;
pub use store::{
    MonthAdjustments, PERCENTAGE_SCALE, PercentageAdjustmentStore, RejectedEntry, SaveReport,
    parse_percentage, scale,
};
