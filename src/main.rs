//! migration-planner CLI
//!
//! Entry point for the command-line tool.
//!
//! Exit codes:
//! - 0: Success
//! - 2: Tool error (config error, unreadable input, irreversible rollback, etc.)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use migration_planner::input::{MigrationDefinition, SqlLoader};
use migration_planner::output::{Report, reporter_for};
use migration_planner::{Config, Direction, Plan, RecordingExecutor, run_change};

/// Default config file name used when --config is not explicitly provided.
const DEFAULT_CONFIG_FILE: &str = "migration-planner.toml";

#[derive(Parser, Debug)]
#[command(name = "migration-planner")]
#[command(about = "Plans table-change migrations and splits SQL scripts", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log progress (info level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log planner internals (debug level)
    #[arg(long, global = true)]
    debug: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split SQL files into individual statements
    Split {
        /// SQL files or directories containing .sql files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Drop comments from the statements
        #[arg(long)]
        strip_comments: bool,

        /// Override output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },

    /// Dry-run a migration definition and report the executor calls it makes
    Plan {
        /// Migration definition file (.toml or .json)
        definition: PathBuf,

        /// Report the calls that would roll the migration back
        #[arg(long)]
        rollback: bool,

        /// Override output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args);

    if let Err(err) = run(args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(2);
    }
}

fn initialize_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    // Reports go to stdout, so logs must not.
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args.config)?;

    let (report, format) = match args.command {
        Command::Split {
            paths,
            strip_comments,
            format,
        } => {
            let loader = SqlLoader::new(strip_comments || config.parser.strip_comments);
            let scripts = loader.load(&paths).context("Failed to load SQL scripts")?;
            tracing::info!("split {} file(s)", scripts.len());
            let statements = scripts.into_iter().flat_map(|s| s.statements).collect();
            (Report::Statements(statements), format)
        }
        Command::Plan {
            definition,
            rollback,
            format,
        } => {
            let intent = MigrationDefinition::from_file(&definition)
                .context("Failed to load migration definition")?
                .into_intent();
            let direction = if rollback {
                Direction::Down
            } else {
                Direction::Up
            };
            tracing::info!(%direction, "planning {} action(s)", intent.len());

            let mut executor = RecordingExecutor::new();
            run_change(direction, &mut executor, |executor| {
                Plan::new(&intent).execute(executor)
            })
            .with_context(|| format!("Failed to plan {}", definition.display()))?;
            (Report::Calls(executor.into_calls()), format)
        }
    };

    let format = format.unwrap_or_else(|| config.output.format.clone());
    let reporter = reporter_for(&format)
        .with_context(|| format!("Unknown output format '{}'", format))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    reporter
        .emit(&report, &mut handle)
        .context(format!("Failed to write {} report", format))?;

    Ok(())
}

/// Load configuration from file.
///
/// If `config_path` is `Some`, the user explicitly passed `--config` and the file
/// must exist (error if not found). If `None`, the default config path is used;
/// a missing default config file is not an error (falls back to defaults with a warning).
fn load_config(config_path: &Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::from_file(path).context("Failed to load configuration")
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::from_file(&default_path).context("Failed to load configuration")
            } else {
                tracing::warn!(
                    "Config file {} not found, using defaults",
                    default_path.display()
                );
                Ok(Config::default())
            }
        }
    }
}
