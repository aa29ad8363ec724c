//! Planner core - domain types and the store seam for weekly day notes
//!
//! This crate provides:
//! - Plan records keyed by (owner, day-of-week, week-start)
//! - Week and day helpers (Monday-based weeks)
//! - The `PlanStore` trait every backend implements
//! - An in-memory store with call accounting

pub mod memory;
pub mod plan;
pub mod store;
pub mod week;

// Re-export main types for convenience
pub use memory::{CallCounts, MemoryStore};
pub use plan::{DayOfWeek, NewPlan, OwnerId, PlanKey, PlanRecord, PlanUpdate};
pub use store::{PlanStore, StoreError};
pub use week::{current_week_start, date_for_day, parse_week_start, week_start_for};
