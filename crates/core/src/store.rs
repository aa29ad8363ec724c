//! The plan store seam
//!
//! Every backend (in-memory, sled journal, a remote table) implements
//! `PlanStore`. The three primitive operations mirror a remote tabular
//! store: lookup by composite key, insert, update by id.

use crate::plan::{DayOfWeek, NewPlan, OwnerId, PlanKey, PlanRecord, PlanUpdate};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use ulid::Ulid;

/// Errors raised by plan stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this id
    #[error("plan record not found: {0}")]
    NotFound(Ulid),

    /// Insert would violate the one-record-per-key invariant
    #[error("a plan already exists for {0}")]
    Conflict(String),

    /// Key component failed validation
    #[error("invalid plan key: {0}")]
    InvalidKey(String),

    /// Stored bytes could not be decoded or encoded
    #[error("codec error: {0}")]
    Codec(String),

    /// Backend failure (I/O, network, database)
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted {
    Created(PlanRecord),
    Updated(PlanRecord),
}

impl Upserted {
    pub fn record(&self) -> &PlanRecord {
        match self {
            Upserted::Created(r) | Upserted::Updated(r) => r,
        }
    }

    pub fn into_record(self) -> PlanRecord {
        match self {
            Upserted::Created(r) | Upserted::Updated(r) => r,
        }
    }
}

/// Persistent store of plan records
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Find the record for a composite key
    async fn find_one(&self, key: &PlanKey) -> Result<Option<PlanRecord>, StoreError>;

    /// Create a record; fails with `Conflict` if the key is taken
    async fn insert(&self, new: NewPlan) -> Result<PlanRecord, StoreError>;

    /// Replace note body and updated-at of the record with `id`
    async fn update(&self, id: Ulid, update: PlanUpdate) -> Result<PlanRecord, StoreError>;

    /// Insert-or-update keyed on the composite key
    ///
    /// The provided version is find-then-branch and is only safe with a single
    /// writer per key. Backends with an atomic primitive override it.
    async fn upsert(&self, key: &PlanKey, notes: &str) -> Result<Upserted, StoreError> {
        match self.find_one(key).await? {
            Some(existing) => self
                .update(existing.id, PlanUpdate::now(notes))
                .await
                .map(Upserted::Updated),
            None => self
                .insert(NewPlan {
                    key: key.clone(),
                    notes: notes.to_string(),
                })
                .await
                .map(Upserted::Created),
        }
    }

    /// Records present for one owner's week, Monday to Sunday
    async fn list_week(
        &self,
        owner: &OwnerId,
        week_start: NaiveDate,
    ) -> Result<Vec<PlanRecord>, StoreError> {
        let mut records = Vec::new();
        for day in DayOfWeek::ALL {
            let key = PlanKey::new(owner.clone(), day, week_start);
            if let Some(record) = self.find_one(&key).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
