//! In-memory plan store with call accounting

use crate::plan::{NewPlan, PlanKey, PlanRecord, PlanUpdate};
use crate::store::{PlanStore, StoreError, Upserted};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use ulid::Ulid;

/// Number of calls made to each store operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub find_one: usize,
    pub insert: usize,
    pub update: usize,
    pub upsert: usize,
}

impl CallCounts {
    /// Calls that mutate the store
    pub fn writes(&self) -> usize {
        self.insert + self.update + self.upsert
    }

    /// All calls
    pub fn total(&self) -> usize {
        self.find_one + self.writes()
    }
}

#[derive(Default)]
struct Tables {
    records: HashMap<PlanKey, PlanRecord>,
    by_id: HashMap<Ulid, PlanKey>,
    /// Note bodies in the order they were written
    written: Vec<String>,
}

/// Process-local `PlanStore`
///
/// Enforces the one-record-per-key invariant, counts calls, and can be told
/// to fail or to respond slowly.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    find_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    update_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    failure: Mutex<Option<StoreError>>,
    latency: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting the call
    pub fn seed(&self, new: NewPlan) -> PlanRecord {
        let record = PlanRecord::create(new, Utc::now());
        let mut tables = self.tables.lock();
        tables.by_id.insert(record.id, record.key.clone());
        tables.records.insert(record.key.clone(), record.clone());
        record
    }

    /// Make every following call fail with `error` (`None` to recover)
    pub fn set_failure(&self, error: Option<StoreError>) {
        *self.failure.lock() = error;
    }

    /// Delay every following call by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            find_one: self.find_calls.load(Ordering::SeqCst),
            insert: self.insert_calls.load(Ordering::SeqCst),
            update: self.update_calls.load(Ordering::SeqCst),
            upsert: self.upsert_calls.load(Ordering::SeqCst),
        }
    }

    /// Note bodies written so far, oldest first
    pub fn written(&self) -> Vec<String> {
        self.tables.lock().written.clone()
    }

    /// Current record for a key, bypassing accounting
    pub fn get(&self, key: &PlanKey) -> Option<PlanRecord> {
        self.tables.lock().records.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.tables.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn enter(&self, counter: &AtomicUsize) -> Result<(), StoreError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn find_one(&self, key: &PlanKey) -> Result<Option<PlanRecord>, StoreError> {
        self.enter(&self.find_calls).await?;
        Ok(self.tables.lock().records.get(key).cloned())
    }

    async fn insert(&self, new: NewPlan) -> Result<PlanRecord, StoreError> {
        self.enter(&self.insert_calls).await?;
        let mut tables = self.tables.lock();
        if tables.records.contains_key(&new.key) {
            return Err(StoreError::Conflict(new.key.to_string()));
        }
        let record = PlanRecord::create(new, Utc::now());
        tables.by_id.insert(record.id, record.key.clone());
        tables.records.insert(record.key.clone(), record.clone());
        tables.written.push(record.notes.clone());
        Ok(record)
    }

    async fn update(&self, id: Ulid, update: PlanUpdate) -> Result<PlanRecord, StoreError> {
        self.enter(&self.update_calls).await?;
        let mut tables = self.tables.lock();
        let key = tables.by_id.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        let record = tables
            .records
            .get_mut(&key)
            .ok_or(StoreError::NotFound(id))?;
        record.apply(update);
        let record = record.clone();
        tables.written.push(record.notes.clone());
        Ok(record)
    }

    async fn upsert(&self, key: &PlanKey, notes: &str) -> Result<Upserted, StoreError> {
        self.enter(&self.upsert_calls).await?;
        let mut tables = self.tables.lock();
        tables.written.push(notes.to_string());
        if let Some(record) = tables.records.get_mut(key) {
            record.apply(PlanUpdate::now(notes));
            return Ok(Upserted::Updated(record.clone()));
        }
        let record = PlanRecord::create(
            NewPlan {
                key: key.clone(),
                notes: notes.to_string(),
            },
            Utc::now(),
        );
        tables.by_id.insert(record.id, key.clone());
        tables.records.insert(key.clone(), record.clone());
        Ok(Upserted::Created(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{DayOfWeek, OwnerId};
    use chrono::NaiveDate;

    fn key(day: DayOfWeek) -> PlanKey {
        PlanKey::new(
            OwnerId::new("u1").unwrap(),
            day,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_enforces_unique_key() {
        let store = MemoryStore::new();
        let new = NewPlan {
            key: key(DayOfWeek::Monday),
            notes: "buy milk".into(),
        };

        store.insert(new.clone()).await.unwrap();
        let err = store.insert(new).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = MemoryStore::new();
        let id = Ulid::new();
        let err = store.update(id, PlanUpdate::now("x")).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(id));
    }

    #[tokio::test]
    async fn test_default_upsert_branches_on_existence() {
        // Wrap to get the trait's provided find-then-branch upsert
        struct Plain(MemoryStore);

        #[async_trait]
        impl PlanStore for Plain {
            async fn find_one(&self, key: &PlanKey) -> Result<Option<PlanRecord>, StoreError> {
                self.0.find_one(key).await
            }
            async fn insert(&self, new: NewPlan) -> Result<PlanRecord, StoreError> {
                self.0.insert(new).await
            }
            async fn update(&self, id: Ulid, update: PlanUpdate) -> Result<PlanRecord, StoreError> {
                self.0.update(id, update).await
            }
        }

        let store = Plain(MemoryStore::new());
        let k = key(DayOfWeek::Monday);

        let first = store.upsert(&k, "buy milk").await.unwrap();
        assert!(matches!(first, Upserted::Created(_)));
        let second = store.upsert(&k, "buy milk and eggs").await.unwrap();
        assert!(matches!(second, Upserted::Updated(_)));
        assert_eq!(first.record().id, second.record().id);

        let calls = store.0.calls();
        assert_eq!(calls.find_one, 2);
        assert_eq!(calls.insert, 1);
        assert_eq!(calls.update, 1);
        assert_eq!(calls.upsert, 0);
    }

    #[tokio::test]
    async fn test_failure_injection_counts_attempts() {
        let store = MemoryStore::new();
        store.set_failure(Some(StoreError::Backend("offline".into())));

        let err = store.find_one(&key(DayOfWeek::Friday)).await.unwrap_err();
        assert_eq!(err, StoreError::Backend("offline".into()));
        assert_eq!(store.calls().find_one, 1);

        store.set_failure(None);
        assert!(store.find_one(&key(DayOfWeek::Friday)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_week_in_day_order() {
        let store = MemoryStore::new();
        store.seed(NewPlan {
            key: key(DayOfWeek::Sunday),
            notes: "rest".into(),
        });
        store.seed(NewPlan {
            key: key(DayOfWeek::Tuesday),
            notes: "gym".into(),
        });

        let owner = OwnerId::new("u1").unwrap();
        let week = store
            .list_week(&owner, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await
            .unwrap();

        let days: Vec<_> = week.iter().map(|r| r.key.day).collect();
        assert_eq!(days, vec![DayOfWeek::Tuesday, DayOfWeek::Sunday]);
    }
}
