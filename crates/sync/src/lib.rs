//! Debounced note synchronization
//!
//! This crate keeps a stored plan record eventually consistent with a text
//! field that is edited at keystroke frequency:
//! - Cancel-and-replace debouncing (1000ms quiet period by default)
//! - Coalescing: only the latest text of a burst is written
//! - Insert-or-update on the (owner, day, week) key
//! - Save status for a "saving..." / "save failed" indicator

pub mod debounce;
pub mod status;
pub mod synchronizer;

pub use debounce::Debouncer;
pub use status::{SaveStatus, SyncState};
pub use synchronizer::{NoteSync, SyncConfig, UpsertMode};
