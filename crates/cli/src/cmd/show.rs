//! Print one day's notes

use crate::{system_config, util};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use planner_core::{PlanKey, PlanStore};

pub async fn run(day: &str, week: Option<&str>) -> Result<()> {
    let config = system_config::load()?;
    let key = PlanKey::new(config.owner()?, util::parse_day(day)?, util::resolve_week(week)?);

    let journal = util::open_journal(&config)?;
    let record = journal
        .find_one(&key)
        .await
        .with_context(|| format!("Failed to read notes for {}", key))?;

    match record {
        Some(record) if !record.notes.is_empty() => println!("{}", record.notes),
        _ => println!("{}", "(no notes)".dimmed()),
    }
    Ok(())
}
