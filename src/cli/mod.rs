//! Command-line interface for inspecting and replaying action logs.

mod counter;

use anyhow::{Context, Result};
use anyflux::action::ActionLog;
use anyflux::config::Config;
use anyflux::Store;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "anyflux")]
#[command(about = "Inspect and replay recorded store actions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every action in a JSON-lines log
    Inspect {
        /// Path to the log
        log: PathBuf,
    },

    /// Fold a log through the counter store and print the final state
    Replay {
        /// Path to the log
        log: PathBuf,

        /// TOML configuration for the store's middleware
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the actions that reached the store to this file
        #[arg(long)]
        record: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Inspect { log } => inspect(&log),
        Command::Replay {
            log,
            config,
            record,
        } => replay(&log, config.as_deref(), record.as_deref()),
    }
}

fn read_log(path: &Path) -> Result<ActionLog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read action log '{}'", path.display()))?;
    let log = ActionLog::from_json_lines(&content)
        .with_context(|| format!("Invalid action log '{}'", path.display()))?;
    tracing::info!(path = %path.display(), actions = log.len(), "Loaded action log");
    Ok(log)
}

fn inspect(path: &Path) -> Result<()> {
    let log = read_log(path)?;
    for (index, entry) in log.entries.iter().enumerate() {
        let payload = entry
            .payload
            .as_ref()
            .map(|payload| serde_json::Value::Object(payload.clone()).to_string())
            .unwrap_or_else(|| "-".to_string());
        let kind = if entry.is_typed_action { "typed" } else { "plain" };
        println!("{:>4}  {:<24} {:<5}  {}", index + 1, entry.action_type, kind, payload);
    }
    Ok(())
}

fn replay(path: &Path, config_path: Option<&Path>, record: Option<&Path>) -> Result<()> {
    let mut config = match config_path {
        Some(config_path) => Config::load_from(config_path)?,
        None => Config::default(),
    };
    if record.is_some() {
        config.recorder.enabled = true;
    }

    let log = read_log(path)?;
    let configured = config.middleware::<counter::CounterState>();
    let store = Store::new(counter::reducer(), None, configured.middleware);

    let replayed = store
        .replay(log.entries, &counter::registry())
        .context("Replay stopped at an undecodable action")?;
    tracing::info!(replayed, "Replay finished");

    if let (Some(record), Some(recorder)) = (record, configured.recorder) {
        fs::write(record, recorder.log().to_json_lines())
            .with_context(|| format!("Failed to write recording '{}'", record.display()))?;
        tracing::info!(path = %record.display(), actions = recorder.len(), "Wrote recording");
    }

    println!("{}", serde_json::to_string_pretty(&store.state())?);
    Ok(())
}
