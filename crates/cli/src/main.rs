//! Planner CLI - planner command

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod system_config;
mod util;

/// Planner - weekly day notes with debounced saving
#[derive(Parser)]
#[command(name = "planner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the planner home, data directory and config file
    Init {
        /// Owner id to store on plans
        #[arg(long)]
        owner: Option<String>,
    },
    /// Type a day's notes from stdin (one edit per line)
    Edit {
        /// Day label (monday..sunday) or index (0 = Monday)
        #[arg(short, long)]
        day: String,
        /// Any date in the target week (default: current week)
        #[arg(short, long)]
        week: Option<String>,
        /// Pause between lines, in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,
        /// Append to the stored note instead of replacing it
        #[arg(long)]
        append: bool,
        /// Feed the whole input as a single edit
        #[arg(long)]
        whole: bool,
    },
    /// Print a day's notes
    Show {
        /// Day label (monday..sunday) or index (0 = Monday)
        #[arg(short, long)]
        day: String,
        /// Any date in the target week (default: current week)
        #[arg(short, long)]
        week: Option<String>,
    },
    /// Show the seven day cards of a week
    Week {
        /// Any date in the target week (default: current week)
        #[arg(short, long)]
        week: Option<String>,
        /// Print stored records as JSON
        #[arg(long)]
        json: bool,
    },
    /// View and edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a single value
    Get {
        /// Key, e.g. sync.quiet_period_ms
        key: String,
    },
    /// Set a single value
    Set {
        /// Key, e.g. sync.quiet_period_ms
        key: String,
        /// New value
        value: String,
    },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (stderr, RUST_LOG or warn)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { owner } => cmd::init::run(owner).await,
        Commands::Edit { day, week, delay_ms, append, whole } => {
            cmd::edit::run(&day, week.as_deref(), delay_ms, append, whole).await
        }
        Commands::Show { day, week } => cmd::show::run(&day, week.as_deref()).await,
        Commands::Week { week, json } => cmd::week::run(week.as_deref(), json).await,
        Commands::Config { action } => match action {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
