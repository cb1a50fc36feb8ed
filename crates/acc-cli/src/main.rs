// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thin `clap`-based binary over `acc-core`. Not the styled, user-facing
//! CLI product — a JSON-in/JSON-out wrapper a script or another process
//! drives, matching the machine-readable contract in spec §4.13.

mod config;

use std::path::PathBuf;

use acc_core::{ConvertOptions, Orchestrator, ScanOptions};
use acc_ir::Format;
use acc_paths::Env;
use acc_writer::{MergeStrategy, WriteOptions};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Exit code used when a subcommand's own logic fails (scan error, write
/// error, etc). clap itself exits with 2 on a usage error.
const EXIT_RUNTIME_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "acc", version, about = "Agent config converter")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output instead of the default compact form.
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Directory backups are stored under.
    #[arg(long, global = true, default_value = "backups")]
    backup_root: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan one ecosystem's configuration into its raw (pre-canonical) form.
    Scan {
        /// Ecosystem to scan: `claude-code`, `opencode`, or `cursor`.
        format: String,
        /// Project root to additionally scan.
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// Also scan and convert chat history.
        #[arg(long)]
        include_history: bool,
    },
    /// Scan a format and project it onto a target format's rendered files.
    Convert {
        /// Source ecosystem.
        from: String,
        /// Target ecosystem.
        to: String,
        /// Project root to additionally scan.
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// Model id to assume when the source carries none.
        #[arg(long)]
        default_model: Option<String>,
    },
    /// Scan, convert, and write the result to disk.
    Write {
        /// Source ecosystem.
        from: String,
        /// Target ecosystem.
        to: String,
        /// Project root to additionally scan.
        #[arg(long)]
        project_root: Option<PathBuf>,
        /// Preview the write without touching disk.
        #[arg(long)]
        dry_run: bool,
        /// Overwrite existing files that would otherwise be skipped.
        #[arg(long)]
        force: bool,
        /// Skip creating a backup snapshot before writing.
        #[arg(long)]
        no_backup: bool,
        /// How to combine with an already-existing target file.
        #[arg(long, value_enum, default_value = "merge")]
        merge_strategy: MergeStrategyArg,
    },
    /// Backup snapshot management.
    Backups {
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Print the JSON Schema for a canonical type.
    Schema,
}

#[derive(Subcommand, Debug)]
enum BackupAction {
    /// List backups, newest first.
    List,
    /// Restore a backup by id, or the most recent one if omitted.
    Restore {
        /// Backup id to restore.
        id: Option<String>,
    },
    /// Delete a backup by id.
    Delete {
        /// Backup id to delete.
        id: String,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum MergeStrategyArg {
    Overwrite,
    PreserveExisting,
    Merge,
}

impl From<MergeStrategyArg> for MergeStrategy {
    fn from(value: MergeStrategyArg) -> Self {
        match value {
            MergeStrategyArg::Overwrite => MergeStrategy::Overwrite,
            MergeStrategyArg::PreserveExisting => MergeStrategy::PreserveExisting,
            MergeStrategyArg::Merge => MergeStrategy::Merge,
        }
    }
}

fn parse_format(raw: &str) -> Result<Format> {
    match raw {
        "claude-code" => Ok(Format::ClaudeCode),
        "opencode" | "open-code" => Ok(Format::OpenCode),
        "cursor" => Ok(Format::Cursor),
        other => anyhow::bail!("unknown format {other:?}, expected claude-code, opencode, or cursor"),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("acc=debug")
    } else {
        EnvFilter::new("acc=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (config, warnings) = config::load_config(&PathBuf::from("acc.toml"));
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    if let Err(err) = run(cli, &config) {
        eprintln!("error: {err:#}");
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
}

fn run(cli: Cli, config: &config::CliConfig) -> Result<()> {
    let env = Env::from_home(std::env::var("HOME").unwrap_or_default());
    let orchestrator = Orchestrator::new(env, cli.backup_root.clone());

    match cli.command {
        Command::Scan { format, project_root, include_history } => {
            let format = parse_format(&format)?;
            let mut opts = ScanOptions::new(format, orchestrator.env().clone(), project_root);
            opts.include_history = include_history;
            let result = orchestrator.scan(opts).context("scan failed")?;
            print_json(&ScanReport { format: format.display_name(), history_sessions: result.history().len() }, cli.pretty)
        }
        Command::Convert { from, to, project_root, default_model } => {
            let from = parse_format(&from)?;
            let to = parse_format(&to)?;
            let scan = orchestrator
                .scan(ScanOptions::new(from, orchestrator.env().clone(), project_root))
                .context("scan failed")?;
            let opts = convert_options(to, config, default_model);
            let conversion = orchestrator.convert(&scan, opts).context("convert failed")?;
            print_json(&conversion, cli.pretty)
        }
        Command::Write { from, to, project_root, dry_run, force, no_backup, merge_strategy } => {
            let from = parse_format(&from)?;
            let to = parse_format(&to)?;
            let scan = orchestrator
                .scan(ScanOptions::new(from, orchestrator.env().clone(), project_root))
                .context("scan failed")?;
            let opts = convert_options(to, config, None);
            let conversion = orchestrator.convert(&scan, opts).context("convert failed")?;

            let write_opts = WriteOptions {
                dry_run,
                backup: !no_backup,
                force,
                merge_strategy: config.merge_strategy.unwrap_or(merge_strategy.into()),
            };
            let summary = orchestrator.write(&conversion, write_opts).context("write failed")?;
            print_json(&summary, cli.pretty)
        }
        Command::Backups { action } => match action {
            BackupAction::List => {
                let backups = orchestrator.list_backups().context("listing backups failed")?;
                print_json(&backups, cli.pretty)
            }
            BackupAction::Restore { id } => {
                let result = orchestrator.restore(id.as_deref()).context("restore failed")?;
                print_json(&result, cli.pretty)
            }
            BackupAction::Delete { id } => {
                orchestrator.delete_backup(&id).context("delete failed")?;
                print_json(&serde_json::json!({"deleted": id}), cli.pretty)
            }
        },
        Command::Schema => {
            let schema = schema_for!(acc_ir::CanonicalConversionResult);
            print_json(&schema, cli.pretty)
        }
    }
}

fn convert_options(to: Format, config: &config::CliConfig, default_model: Option<String>) -> ConvertOptions {
    ConvertOptions {
        to,
        model_overrides: config.model_overrides.clone(),
        default_model: default_model.or_else(|| config.default_model.clone()),
        default_small_model: config.default_small_model.clone(),
    }
}

#[derive(Debug, Serialize)]
struct ScanReport {
    format: &'static str,
    history_sessions: usize,
}
