//! Configuration management command
//!
//! Provides CLI interface to view and edit the planner configuration.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use planner_sync::UpsertMode;
use std::path::PathBuf;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Planner Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[planner]".yellow());
    println!("  {} = {}", "owner".cyan(), config.planner.owner);
    println!(
        "  {} = {}",
        "data_dir".cyan(),
        config.data_dir()?.display()
    );

    println!("\n{}", "[sync]".yellow());
    println!(
        "  {} = {} {}",
        "quiet_period_ms".cyan(),
        config.sync.quiet_period_ms,
        format!("({:.1}s)", config.sync.quiet_period_ms as f64 / 1000.0).dimmed()
    );
    println!(
        "  {} = {}",
        "write_timeout_ms".cyan(),
        config.sync.write_timeout_ms
    );
    println!(
        "  {} = {}",
        "upsert_mode".cyan(),
        upsert_mode_name(config.sync.upsert_mode)
    );
    println!(
        "  {} = {}",
        "skip_unchanged".cyan(),
        config.sync.skip_unchanged
    );

    println!("\n{}", "Valid Ranges:".bold());
    println!("  quiet_period_ms: 50-60,000");
    println!("  write_timeout_ms: 100-300,000");
    println!("  upsert_mode: check_then_act | atomic");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load()?;
    set_value(&mut config, key, value)?;

    // Validate before saving
    config.validate()
        .context("Invalid configuration value")?;

    system_config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    if create && system_config::init_if_missing()? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else {
        println!("{}", config_path.display());
        if !config_path.exists() {
            println!("{}", "File does not exist. Use --create to create it.".yellow());
        }
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}

fn upsert_mode_name(mode: UpsertMode) -> &'static str {
    match mode {
        UpsertMode::CheckThenAct => "check_then_act",
        UpsertMode::Atomic => "atomic",
    }
}

fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let value = match key {
        "planner.owner" => config.planner.owner.clone(),
        "planner.data_dir" => config.data_dir()?.display().to_string(),
        "sync.quiet_period_ms" => config.sync.quiet_period_ms.to_string(),
        "sync.write_timeout_ms" => config.sync.write_timeout_ms.to_string(),
        "sync.upsert_mode" => upsert_mode_name(config.sync.upsert_mode).to_string(),
        "sync.skip_unchanged" => config.sync.skip_unchanged.to_string(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'planner config list' to see available keys.",
            key
        ),
    };
    Ok(value)
}

fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "planner.owner" => {
            config.planner.owner = value.to_string();
        }
        "planner.data_dir" => {
            config.planner.data_dir = Some(PathBuf::from(value));
        }
        "sync.quiet_period_ms" => {
            config.sync.quiet_period_ms = value.parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "sync.write_timeout_ms" => {
            config.sync.write_timeout_ms = value.parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "sync.upsert_mode" => {
            config.sync.upsert_mode = match value {
                "check_then_act" => UpsertMode::CheckThenAct,
                "atomic" => UpsertMode::Atomic,
                _ => anyhow::bail!("Invalid value: must be 'check_then_act' or 'atomic'"),
            };
        }
        "sync.skip_unchanged" => {
            config.sync.skip_unchanged = value.parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'planner config list' to see available keys.",
            key
        ),
    }
    Ok(())
}
