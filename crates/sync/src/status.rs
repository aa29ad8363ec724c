//! Save status reported to the editing surface

use chrono::{DateTime, Utc};

/// Per-field synchronizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Nothing scheduled
    #[default]
    Idle,
    /// Quiet-period timer armed
    PendingWrite,
    /// A store call is in flight
    Writing,
}

/// Snapshot published after every state change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveStatus {
    pub state: SyncState,
    /// `updated_at` of the last record written
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Message of the most recent failed save, cleared by the next success
    pub last_error: Option<String>,
    /// Successful writes
    pub writes: u64,
    /// Failed writes (including timeouts)
    pub failures: u64,
}

impl SaveStatus {
    /// True when the last save attempt failed
    pub fn save_failed(&self) -> bool {
        self.last_error.is_some()
    }
}
