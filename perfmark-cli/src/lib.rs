#![warn(missing_docs)]
//! Perfmark CLI Library
//!
//! Inspects and maintains the history document written by
//! `perfmark::PerformanceHelper` when file storage is enabled.
//!
//! ```text
//! perfmark list [FILTER]             identifiers and result counts
//! perfmark show [FILTER] --format    aggregates with the configured outlier policy
//! perfmark discard <ID>              drop one identifier's stored history
//! perfmark init                      write a default perfmark.toml
//! ```

mod formatting;
mod report;

pub use formatting::{format_duration, format_human_output, format_listing};
pub use report::{HistoryReport, IdentifierReport, build_report, select, summarize_identifier};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use perfmark::{CONFIG_FILE_NAME, HelperConfig, HistoryStore, JsonFileStore};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Perfmark CLI arguments
#[derive(Parser, Debug)]
#[command(name = "perfmark")]
#[command(author, version, about = "Perfmark - inspect recorded measurement history")]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (discovered from the current directory if omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// History document (overrides `storage_path` from the configuration)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored identifiers
    List {
        /// Filter identifiers by regex pattern
        filter: Option<String>,
    },
    /// Show aggregate statistics per identifier
    Show {
        /// Filter identifiers by regex pattern
        filter: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Remove one identifier's stored history
    Discard {
        /// Identifier to remove
        identifier: String,
    },
    /// Write a default perfmark.toml into the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Terminal-friendly text
    Human,
    /// Pretty-printed JSON
    Json,
}

/// Run the Perfmark CLI with the process arguments
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Perfmark CLI with pre-parsed arguments, writing to stdout
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &std::env::current_dir()?, &mut out)
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "perfmark=debug" } else { "perfmark=info" };
    // A subscriber may already be installed by an embedding program
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute a parsed command relative to `cwd`
pub fn execute(cli: &Cli, cwd: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init { force } => init_config(&cwd.join(CONFIG_FILE_NAME), *force, out)?,
        Commands::List { filter } => {
            let (config, store) = open_store(cli, cwd)?;
            let filter = compile_filter(filter.as_deref())?;
            let report = build_report(&store.load_all()?, filter.as_ref(), config.outlier_policy());
            write!(out, "{}", format_listing(&report))?;
        }
        Commands::Show { filter, format } => {
            let (config, store) = open_store(cli, cwd)?;
            let filter = compile_filter(filter.as_deref())?;
            let report = build_report(&store.load_all()?, filter.as_ref(), config.outlier_policy());
            match format {
                OutputFormat::Human => write!(out, "{}", format_human_output(&report))?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &report)?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Discard { identifier } => {
            let (_, mut store) = open_store(cli, cwd)?;
            if store.remove(identifier)? {
                tracing::info!(target: "perfmark", identifier = %identifier, "history discarded");
                writeln!(out, "Discarded {identifier}")?;
            } else {
                writeln!(out, "No stored history for {identifier}")?;
            }
        }
    }

    Ok(())
}

/// Resolve configuration and the history document it points at
fn open_store(cli: &Cli, cwd: &Path) -> anyhow::Result<(HelperConfig, JsonFileStore)> {
    let config = load_config(cli, cwd)?;
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| cwd.join(&config.storage_path));
    tracing::debug!(target: "perfmark", path = %store_path.display(), "opening history");
    Ok((config, JsonFileStore::new(store_path)))
}

fn load_config(cli: &Cli, cwd: &Path) -> anyhow::Result<HelperConfig> {
    match &cli.config {
        Some(path) => HelperConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(HelperConfig::discover_from(cwd).unwrap_or_default()),
    }
}

fn compile_filter(pattern: Option<&str>) -> anyhow::Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).with_context(|| format!("Invalid filter pattern '{p}'")))
        .transpose()
}

fn init_config(path: &Path, force: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    std::fs::write(path, HelperConfig::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writeln!(out, "Created {}", path.display())?;
    Ok(())
}
