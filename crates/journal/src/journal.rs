//! Plan journal using sled

use crate::codec::{decode_record, encode_record, key_bytes};
use async_trait::async_trait;
use chrono::Utc;
use planner_core::store::Upserted;
use planner_core::{NewPlan, PlanKey, PlanRecord, PlanStore, PlanUpdate, StoreError};
use sled::transaction::{abort, ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use tracing::debug;
use ulid::Ulid;

/// Durable store of plan records
///
/// Layout inside `plans.db`:
/// - `plans`: composite key bytes -> versioned record
/// - `plan_ids`: ULID bytes -> composite key bytes
pub struct PlanJournal {
    /// Sled database
    db: Db,
    /// Records keyed by composite key
    plans: Tree,
    /// Id index for updates by id
    ids: Tree,
}

fn backend(err: sled::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn transaction(err: TransactionError<StoreError>) -> StoreError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => backend(e),
    }
}

impl PlanJournal {
    /// Open or create a journal in the given directory
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let db = sled::open(dir.join("plans.db")).map_err(backend)?;
        let plans = db.open_tree("plans").map_err(backend)?;
        let ids = db.open_tree("plan_ids").map_err(backend)?;
        debug!("Opened plan journal at {} ({} plans)", dir.display(), plans.len());
        Ok(Self { db, plans, ids })
    }

    /// Number of stored plans
    pub fn count(&self) -> usize {
        self.plans.len()
    }

    /// Flush to ensure durability
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl PlanStore for PlanJournal {
    async fn find_one(&self, key: &PlanKey) -> Result<Option<PlanRecord>, StoreError> {
        match self.plans.get(key_bytes(key)).map_err(backend)? {
            Some(value) => Ok(Some(decode_record(&value)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, new: NewPlan) -> Result<PlanRecord, StoreError> {
        let record = PlanRecord::create(new, Utc::now());
        let key = key_bytes(&record.key);
        let value = encode_record(&record)?;

        // Record and id index land together or not at all
        (&self.plans, &self.ids)
            .transaction(|(plans, ids)| {
                if plans.get(&key)?.is_some() {
                    return abort(StoreError::Conflict(record.key.to_string()));
                }
                plans.insert(key.as_slice(), value.as_slice())?;
                ids.insert(&record.id.to_bytes()[..], key.as_slice())?;
                Ok(())
            })
            .map_err(transaction)?;
        self.flush()?;
        debug!("Inserted plan {} for {}", record.id, record.key);
        Ok(record)
    }

    async fn update(&self, id: Ulid, update: PlanUpdate) -> Result<PlanRecord, StoreError> {
        let key = self
            .ids
            .get(id.to_bytes())
            .map_err(backend)?
            .ok_or(StoreError::NotFound(id))?;

        let mut failure = None;
        let updated = self
            .plans
            .update_and_fetch(&key, |old| {
                failure = None;
                let old = old?;
                let result = decode_record(old).and_then(|mut record| {
                    record.apply(update.clone());
                    encode_record(&record)
                });
                match result {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        // Leave the stored value untouched
                        failure = Some(e);
                        Some(old.to_vec())
                    }
                }
            })
            .map_err(backend)?;

        if let Some(e) = failure {
            return Err(e);
        }
        let record = decode_record(&updated.ok_or(StoreError::NotFound(id))?)?;
        self.flush()?;
        debug!("Updated plan {} for {}", record.id, record.key);
        Ok(record)
    }

    async fn upsert(&self, key: &PlanKey, notes: &str) -> Result<Upserted, StoreError> {
        let tree_key = key_bytes(key);

        let (record, created) = (&self.plans, &self.ids)
            .transaction(|(plans, ids)| {
                let (record, created) = match plans.get(&tree_key)? {
                    Some(old) => {
                        let mut record =
                            decode_record(&old).map_err(ConflictableTransactionError::Abort)?;
                        record.apply(PlanUpdate::now(notes));
                        (record, false)
                    }
                    None => {
                        let record = PlanRecord::create(
                            NewPlan {
                                key: key.clone(),
                                notes: notes.to_string(),
                            },
                            Utc::now(),
                        );
                        (record, true)
                    }
                };

                let bytes = encode_record(&record).map_err(ConflictableTransactionError::Abort)?;
                plans.insert(tree_key.as_slice(), bytes)?;
                if created {
                    ids.insert(&record.id.to_bytes()[..], tree_key.as_slice())?;
                }
                Ok((record, created))
            })
            .map_err(transaction)?;

        self.flush()?;
        debug!("Upserted plan {} for {} (created: {})", record.id, record.key, created);

        Ok(if created {
            Upserted::Created(record)
        } else {
            Upserted::Updated(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planner_core::{DayOfWeek, OwnerId};
    use tempfile::TempDir;

    fn key(day: DayOfWeek) -> PlanKey {
        PlanKey::new(
            OwnerId::new("u1").unwrap(),
            day,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn new_plan(day: DayOfWeek, notes: &str) -> NewPlan {
        NewPlan {
            key: key(day),
            notes: notes.into(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let temp_dir = TempDir::new().unwrap();
        let journal = PlanJournal::open(temp_dir.path()).unwrap();

        assert!(journal.find_one(&key(DayOfWeek::Monday)).await.unwrap().is_none());

        let inserted = journal.insert(new_plan(DayOfWeek::Monday, "buy milk")).await.unwrap();
        let found = journal.find_one(&key(DayOfWeek::Monday)).await.unwrap().unwrap();

        assert_eq!(found, inserted);
        assert_eq!(journal.count(), 1);
    }

    #[tokio::test]
    async fn test_insert_conflict_on_same_key() {
        let temp_dir = TempDir::new().unwrap();
        let journal = PlanJournal::open(temp_dir.path()).unwrap();

        journal.insert(new_plan(DayOfWeek::Monday, "a")).await.unwrap();
        let err = journal.insert(new_plan(DayOfWeek::Monday, "b")).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        let kept = journal.find_one(&key(DayOfWeek::Monday)).await.unwrap().unwrap();
        assert_eq!(kept.notes, "a");
        // The aborted insert left no id behind
        assert_eq!(journal.ids.len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let journal = PlanJournal::open(temp_dir.path()).unwrap();

        let inserted = journal.insert(new_plan(DayOfWeek::Monday, "buy milk")).await.unwrap();
        let updated = journal
            .update(inserted.id, PlanUpdate::now("buy milk and eggs"))
            .await
            .unwrap();

        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.notes, "buy milk and eggs");
        assert_eq!(updated.created_at, inserted.created_at);

        let missing = Ulid::new();
        let err = journal.update(missing, PlanUpdate::now("x")).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(missing));
    }

    #[tokio::test]
    async fn test_atomic_upsert_keeps_one_record_per_key() {
        let temp_dir = TempDir::new().unwrap();
        let journal = PlanJournal::open(temp_dir.path()).unwrap();
        let k = key(DayOfWeek::Friday);

        let first = journal.upsert(&k, "draft").await.unwrap();
        let second = journal.upsert(&k, "final").await.unwrap();

        assert!(matches!(first, Upserted::Created(_)));
        assert!(matches!(second, Upserted::Updated(_)));
        assert_eq!(first.record().id, second.record().id);
        assert_eq!(journal.count(), 1);
        assert_eq!(journal.ids.len(), 1);

        // The id index written by upsert serves updates by id
        let updated = journal
            .update(second.record().id, PlanUpdate::now("edited"))
            .await
            .unwrap();
        assert_eq!(updated.notes, "edited");
    }

    #[tokio::test]
    async fn test_reopen_keeps_records() {
        let temp_dir = TempDir::new().unwrap();
        let id = {
            let journal = PlanJournal::open(temp_dir.path()).unwrap();
            journal.insert(new_plan(DayOfWeek::Sunday, "rest")).await.unwrap().id
        };

        let journal = PlanJournal::open(temp_dir.path()).unwrap();
        let record = journal.find_one(&key(DayOfWeek::Sunday)).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(journal.count(), 1);
    }

    #[tokio::test]
    async fn test_list_week_skips_other_weeks() {
        let temp_dir = TempDir::new().unwrap();
        let journal = PlanJournal::open(temp_dir.path()).unwrap();

        journal.insert(new_plan(DayOfWeek::Tuesday, "this week")).await.unwrap();
        journal
            .insert(NewPlan {
                key: PlanKey::new(
                    OwnerId::new("u1").unwrap(),
                    DayOfWeek::Tuesday,
                    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
                ),
                notes: "next week".into(),
            })
            .await
            .unwrap();

        let owner = OwnerId::new("u1").unwrap();
        let week = journal
            .list_week(&owner, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].notes, "this week");
    }
}
