//! Schedule updater CLI
//!
//! Runs one reconciliation pass per invocation; schedule it per topic.

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use schedule_updater::{
    error::Result,
    models::{Config, Topic},
    pipeline::{self, DiffEngine, UpdateOutcome},
    services::{JsonFileFetcher, notifier},
    storage,
};

/// Pushes only what changed in the school's published schedules
#[derive(Parser, Debug)]
#[command(name = "updater", version, about = "School schedule diff updater")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile one topic and push its diff document
    Update {
        /// Topic to update (see `topics`)
        topic: Topic,

        /// Read the fetched value from this file instead of {input_dir}/{topic}.json
        #[arg(long)]
        input: Option<PathBuf>,

        /// Log the diff document instead of pushing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the stored baseline of a topic
    Show { topic: Topic },

    /// List topic names
    Topics,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                Local::now().format("%d-%m %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load_optional(&cli.config);
    let level = match &loaded {
        Ok(Some(config)) => config.logging.level.clone(),
        _ => Config::default().logging.level,
    };
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(Some(config)) => {
            log::debug!("Loaded configuration from {}", cli.config.display());
            config
        }
        Ok(None) => {
            log::warn!(
                "No config file at {}. Using defaults.",
                cli.config.display()
            );
            Config::default()
        }
        Err(e) => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };

    match cli.command {
        Command::Update {
            topic,
            input,
            dry_run,
        } => {
            config.validate()?;

            let store = storage::open(&config.storage).await?;
            let engine = DiffEngine::new(store);
            let fetcher = match input {
                Some(path) => JsonFileFetcher::from_file(path),
                None => JsonFileFetcher::from_dir(&config.fetch.input_dir),
            };
            let notifier = notifier::from_config(&config.notifier, dry_run)?;

            match pipeline::run_update(topic, &fetcher, &engine, notifier.as_ref()).await? {
                UpdateOutcome::Sent { .. } => log::info!("{} updated", topic),
                UpdateOutcome::Logged { .. } => {
                    log::info!("{} baseline committed; diff logged, not pushed", topic)
                }
                UpdateOutcome::Unchanged => {}
                UpdateOutcome::NotifyFailed { .. } => {
                    log::warn!("{} baseline committed, but delivery failed", topic)
                }
            }
        }

        Command::Show { topic } => {
            let store = storage::open(&config.storage).await?;
            match DiffEngine::new(store).baseline(topic).await? {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => log::info!("No baseline recorded for {} yet.", topic),
            }
        }

        Command::Topics => {
            for topic in Topic::ALL {
                println!(" - {}", topic);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
