//! Initialize the planner home

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub async fn run(owner: Option<String>) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    let mut config = if config_path.exists() {
        system_config::load()?
    } else {
        SystemConfig::default()
    };
    if let Some(owner) = owner {
        config.planner.owner = owner;
    }
    system_config::save(&config).context("Failed to write configuration")?;

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    println!("{} Initialized planner", "✓".green());
    println!();
    println!("  config: {}", config_path.display());
    println!("  data:   {}", data_dir.display());
    println!("  owner:  {}", config.planner.owner.cyan());
    println!();
    println!("Next steps:");
    println!("  - Run 'planner edit --day monday' and type your notes");
    println!("  - Run 'planner week' to see this week's cards");
    Ok(())
}
