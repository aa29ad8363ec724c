//! Durable plan storage
//!
//! This crate provides:
//! - A sled-backed `PlanStore` (one tree keyed by the composite key, one id index)
//! - A versioned bincode record codec
//! - Atomic insert-or-update on the composite key

pub mod codec;
pub mod journal;

// Re-exports
pub use journal::PlanJournal;
