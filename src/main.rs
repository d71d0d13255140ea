//! snapdiff CLI - hash-tree differencing for JSON snapshots
//!
//! Feeds JSON files through a `DiffEngine` and prints the resulting trees
//! and change notifications. Intended as a host for scripts and watch loops.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use snapdiff::logging::{init_logging, LogLevel};
use snapdiff::{Change, ChangeSet, DiffEngine, DigestOrder, EngineConfig, TreeBuilder};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "snapdiff")]
#[command(about = "Incremental hash-tree differencing for JSON snapshots")]
#[command(version)]
struct Cli {
    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Engine config file (default: ~/.config/snapdiff/config.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Property marking an object as an opaque leaf
    #[arg(long)]
    discriminator: Option<String>,

    /// Child order used when recomputing digests (insertion or sorted)
    #[arg(long)]
    digest_order: Option<DigestOrder>,

    /// Log level (overrides SNAPDIFF_LOG)
    #[arg(long)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the hash tree of a JSON file
    Tree {
        /// The snapshot file
        file: PathBuf,
    },

    /// Report changes between two snapshots
    Diff {
        /// Baseline snapshot
        old: PathBuf,
        /// New snapshot
        new: PathBuf,
        /// Exit with status 1 when changes were found
        #[arg(long)]
        exit_code: bool,
    },

    /// Apply a sequence of snapshots to one engine, reporting each step
    Replay {
        /// Snapshots in order; the first one is the baseline
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,
    },

    /// Show the effective engine configuration
    Config {
        /// Also write it to the default config path
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;
    let config = resolve_config(&cli)?;

    match &cli.command {
        Commands::Tree { file } => {
            let snapshot = read_snapshot(file)?;
            let tree = TreeBuilder::new(&config).build(&snapshot)?;
            output(
                cli.format,
                &serde_json::json!({
                    "file": file.display().to_string(),
                    "digest": tree.digest().to_hex(),
                    "tree": tree
                }),
            )?;
        }

        Commands::Diff { old, new, exit_code } => {
            let (mut engine, rx) = engine_with_channel(config);
            engine.initialize(&read_snapshot(old)?)?;
            let digest = engine.update(&read_snapshot(new)?)?.digest();
            let changes: ChangeSet = rx.try_iter().collect();

            output(
                cli.format,
                &serde_json::json!({
                    "old": old.display().to_string(),
                    "new": new.display().to_string(),
                    "digest": digest.to_hex(),
                    "added": changes.added_count(),
                    "removed": changes.removed_count(),
                    "modified": changes.modified_count(),
                    "changes": changes.changes
                }),
            )?;

            if *exit_code && !changes.is_empty() {
                std::process::exit(1);
            }
        }

        Commands::Replay { files } => {
            let (mut engine, rx) = engine_with_channel(config);
            let (baseline, rest) = files
                .split_first()
                .ok_or_else(|| anyhow::anyhow!("No snapshots given"))?;
            engine.initialize(&read_snapshot(baseline)?)?;

            let mut steps = Vec::with_capacity(rest.len());
            for file in rest {
                let digest = engine.update(&read_snapshot(file)?)?.digest();
                let changes: Vec<Change> = rx.try_iter().collect();
                steps.push(serde_json::json!({
                    "file": file.display().to_string(),
                    "digest": digest.to_hex(),
                    "stats": engine.last_stats(),
                    "changes": changes
                }));
            }

            output(
                cli.format,
                &serde_json::json!({
                    "baseline": baseline.display().to_string(),
                    "digest": engine.digest().to_hex(),
                    "steps": steps
                }),
            )?;
        }

        Commands::Config { save } => {
            let mut result = serde_json::json!({ "config": config });
            if *save {
                let path = EngineConfig::default_path()?;
                config.save(&path)?;
                result["saved_to"] = Value::String(path.display().to_string());
            }
            output(cli.format, &result)?;
        }
    }

    Ok(())
}

/// Defaults, then environment, then the fields a config file sets, then CLI flags
fn resolve_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::from_env()?;

    let file = cli.config.clone().or_else(|| {
        EngineConfig::default_path()
            .ok()
            .filter(|path| path.exists())
    });
    if let Some(path) = file {
        config = config.merge_file(path)?;
    }

    if let Some(discriminator) = &cli.discriminator {
        config.discriminator = discriminator.clone();
    }
    if let Some(order) = cli.digest_order {
        config.digest_order = order;
    }
    config.validate()?;
    Ok(config)
}

fn engine_with_channel(config: EngineConfig) -> (DiffEngine, mpsc::Receiver<Change>) {
    let (tx, rx) = mpsc::channel();
    let mut engine = DiffEngine::new(config);
    engine.subscribe(move |change: &Change| {
        // receiver lives until main returns
        let _ = tx.send(change.clone());
    });
    (engine, rx)
}

fn read_snapshot(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn output(format: OutputFormat, value: &Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
