//! Plan record data structures

use crate::store::StoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Opaque identifier of the user owning a plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner id, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, StoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(StoreError::InvalidKey("owner id must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Day of the week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days in display order
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Day for a Monday-based index (0 = Monday)
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Monday-based index (0 = Monday)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stored label ("monday", "tuesday", ...)
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    /// Turkish display name, as shown on the day cards
    pub fn turkish_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Pazartesi",
            DayOfWeek::Tuesday => "Salı",
            DayOfWeek::Wednesday => "Çarşamba",
            DayOfWeek::Thursday => "Perşembe",
            DayOfWeek::Friday => "Cuma",
            DayOfWeek::Saturday => "Cumartesi",
            DayOfWeek::Sunday => "Pazar",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.as_str() == lowered)
            .ok_or_else(|| StoreError::InvalidKey(format!("unknown day of week: '{}'", s)))
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

/// Composite natural key of a plan record
///
/// At most one record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanKey {
    pub owner: OwnerId,
    pub day: DayOfWeek,
    /// Monday of the week this plan belongs to
    pub week_start: NaiveDate,
}

impl PlanKey {
    pub fn new(owner: OwnerId, day: DayOfWeek, week_start: NaiveDate) -> Self {
        Self {
            owner,
            day,
            week_start,
        }
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.owner,
            self.day,
            self.week_start.format("%Y-%m-%d")
        )
    }
}

/// A stored plan: the note for one day of one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Row id (ULID)
    pub id: Ulid,
    pub key: PlanKey,
    /// Free-text note body
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanRecord {
    /// Build a fresh record for an insert
    pub fn create(new: NewPlan, now: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new(),
            key: new.key,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place
    pub fn apply(&mut self, update: PlanUpdate) {
        self.notes = update.notes;
        self.updated_at = update.updated_at;
    }
}

/// Insert payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    pub key: PlanKey,
    pub notes: String,
}

/// Update payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanUpdate {
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl PlanUpdate {
    /// Update stamped with the current time
    pub fn now(notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_labels_round_trip_through_from_str() {
        for day in DayOfWeek::ALL {
            assert_eq!(day.as_str().parse::<DayOfWeek>().unwrap(), day);
        }
        assert_eq!("  Friday ".parse::<DayOfWeek>().unwrap(), DayOfWeek::Friday);
        assert!("someday".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn test_day_index_is_monday_based() {
        assert_eq!(DayOfWeek::from_index(0), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::from_index(6), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::from_index(7), None);
        assert_eq!(DayOfWeek::Thursday.index(), 3);
        assert_eq!(DayOfWeek::from(chrono::Weekday::Sun), DayOfWeek::Sunday);
    }

    #[test]
    fn test_owner_rejects_blank() {
        assert!(OwnerId::new("").is_err());
        assert!(OwnerId::new("   ").is_err());
        assert_eq!(OwnerId::new("u1").unwrap().as_str(), "u1");
    }

    #[test]
    fn test_key_display() {
        let key = PlanKey::new(
            OwnerId::new("u1").unwrap(),
            DayOfWeek::Monday,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert_eq!(key.to_string(), "u1/monday/2024-01-01");
    }

    #[test]
    fn test_apply_update_keeps_identity() {
        let key = PlanKey::new(
            OwnerId::new("u1").unwrap(),
            DayOfWeek::Monday,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let created = Utc::now();
        let mut record = PlanRecord::create(
            NewPlan {
                key,
                notes: "buy milk".into(),
            },
            created,
        );
        let id = record.id;

        record.apply(PlanUpdate::now("buy milk and eggs"));

        assert_eq!(record.id, id);
        assert_eq!(record.notes, "buy milk and eggs");
        assert_eq!(record.created_at, created);
        assert!(record.updated_at >= created);
    }
}
