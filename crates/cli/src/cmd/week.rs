//! Show the seven day cards of a week

use crate::{system_config, util};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use planner_core::{date_for_day, DayOfWeek, PlanStore};

/// Characters of a note shown on a card
const PREVIEW_CHARS: usize = 50;

pub async fn run(week: Option<&str>, json: bool) -> Result<()> {
    let config = system_config::load()?;
    let owner = config.owner()?;
    let week_start = util::resolve_week(week)?;

    let journal = util::open_journal(&config)?;
    let records = journal
        .list_week(&owner, week_start)
        .await
        .context("Failed to read week")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Week of".bold(),
        week_start.format("%Y-%m-%d").to_string().bold()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for day in DayOfWeek::ALL {
        let date = date_for_day(week_start, day);
        let header = format!("{:<10} {}", day.turkish_name(), util::short_date(date));
        match records.iter().find(|r| r.key.day == day) {
            Some(record) if !record.notes.is_empty() => {
                println!(
                    "{}  {} {}",
                    header.yellow(),
                    util::preview(&record.notes, PREVIEW_CHARS),
                    format!("({})", util::format_relative_time(record.updated_at)).dimmed()
                );
            }
            _ => println!("{}  {}", header.yellow(), "-".dimmed()),
        }
    }
    Ok(())
}
