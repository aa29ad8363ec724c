//! Shared utilities for CLI commands

use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use planner_core::{current_week_start, parse_week_start, DayOfWeek};
use planner_journal::PlanJournal;
use std::sync::Arc;

/// Open the journal named by the configuration, creating its directory
pub fn open_journal(config: &SystemConfig) -> Result<Arc<PlanJournal>> {
    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let journal = PlanJournal::open(&data_dir)
        .with_context(|| format!("Failed to open plan journal in {}", data_dir.display()))?;
    Ok(Arc::new(journal))
}

/// Resolve `--week` (any date in the week) or default to the current week
pub fn resolve_week(week: Option<&str>) -> Result<NaiveDate> {
    match week {
        Some(reference) => Ok(parse_week_start(reference)?),
        None => Ok(current_week_start()),
    }
}

/// Parse `--day`: a label ("monday") or a Monday-based index ("0")
pub fn parse_day(day: &str) -> Result<DayOfWeek> {
    if let Ok(index) = day.parse::<usize>() {
        return DayOfWeek::from_index(index)
            .with_context(|| format!("Day index out of range (0-6): {}", index));
    }
    Ok(day.parse::<DayOfWeek>()?)
}

/// Short Turkish date for day cards ("2 Oca")
pub fn short_date(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
    ];
    format!("{} {}", date.day(), MONTHS[date.month0() as usize])
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(ts);
    let seconds = elapsed.num_seconds();

    if seconds < 0 {
        "in the future".to_string()
    } else if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// First `max_chars` characters of a note, with "..." when cut
pub fn preview(notes: &str, max_chars: usize) -> String {
    let flat = notes.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_relative_time() {
        let now = Utc::now();

        assert!(format_relative_time(now).contains("seconds ago"));
        assert!(format_relative_time(now - Duration::hours(1)).contains("hour"));
        assert!(format_relative_time(now - Duration::days(1)).contains("day"));
        assert!(format_relative_time(now - Duration::weeks(3)).contains("weeks"));
        assert_eq!(format_relative_time(now + Duration::hours(1)), "in the future");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 50), "short");
        assert_eq!(preview("line one\nline two", 50), "line one line two");
        let long = "ş".repeat(60);
        assert_eq!(preview(&long, 50), format!("{}...", "ş".repeat(50)));
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), "2 Oca");
        assert_eq!(short_date(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()), "15 Ağu");
        assert_eq!(short_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()), "31 Ara");
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("monday").unwrap(), DayOfWeek::Monday);
        assert_eq!(parse_day("6").unwrap(), DayOfWeek::Sunday);
        assert!(parse_day("7").is_err());
        assert!(parse_day("funday").is_err());
    }

    #[test]
    fn test_resolve_week() {
        assert_eq!(
            resolve_week(Some("2024-01-04")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(resolve_week(None).unwrap(), current_week_start());
    }
}
