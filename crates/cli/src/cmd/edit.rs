//! Type a day's notes from stdin
//!
//! Every input line is one edit carrying the full text so far, exactly as a
//! text area reports keystrokes. Saving goes through the debounced
//! synchronizer; EOF flushes whatever is still pending.

use crate::{system_config, util};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use planner_core::{date_for_day, PlanKey};
use planner_sync::NoteSync;
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub async fn run(
    day: &str,
    week: Option<&str>,
    delay_ms: u64,
    append: bool,
    whole: bool,
) -> Result<()> {
    let config = system_config::load()?;
    let day = util::parse_day(day)?;
    let week_start = util::resolve_week(week)?;
    let key = PlanKey::new(config.owner()?, day, week_start);

    let journal = util::open_journal(&config)?;
    let sync = NoteSync::open(journal, key.clone(), config.sync_config()).await;

    let mut text = if append { sync.text() } else { String::new() };
    // Lines already in `text`; an appended note counts as one
    let mut line_count = usize::from(!text.is_empty());
    let mut lines = read_lines();
    let delay = Duration::from_millis(delay_ms);
    let mut edits = 0usize;

    if whole {
        let mut input = Vec::new();
        while let Some(line) = lines.recv().await {
            input.push(line.context("Failed to read stdin")?);
        }
        push_line(&mut text, &mut line_count, &input.join("\n"));
        sync.on_edit(text.clone());
        edits += 1;
    } else {
        while let Some(line) = lines.recv().await {
            push_line(&mut text, &mut line_count, &line.context("Failed to read stdin")?);
            sync.on_edit(text.clone());
            edits += 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
    debug!("Read {} edits for {}", edits, key);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message("Saving...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    sync.flush().await;
    spinner.finish_and_clear();

    let status = sync.shutdown().await;
    let date = date_for_day(week_start, day);

    if let Some(error) = status.last_error {
        anyhow::bail!("Save failed for {} ({}): {}", day, date, error);
    }
    if status.writes == 0 {
        println!("{}", "No changes to save".dimmed());
    } else {
        println!(
            "{} Saved {} {} {}",
            "✓".green(),
            day.turkish_name().bold(),
            date.format("%Y-%m-%d").to_string().dimmed(),
            format!("({} writes for {} edits)", status.writes, edits).dimmed()
        );
    }
    Ok(())
}

/// Append one typed line; blank lines count, so leading ones survive
fn push_line(text: &mut String, line_count: &mut usize, line: &str) {
    if *line_count > 0 {
        text.push('\n');
    }
    text.push_str(line);
    *line_count += 1;
}

/// Stream stdin lines from a blocking reader thread
fn read_lines() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(64);
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}
