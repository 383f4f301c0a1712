//! localstore - inspect and edit a local settings database

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use localstore_core::{Configuration, LocalStore, SqliteKv, VersionRegistry, RESET_LOCAL_FLAG};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "localstore",
    version,
    about = "Inspect and edit a local settings database",
    long_about = "Reads and writes settings the same way an application using localstore-core does:\n\
                  cached value, then the database, then the configured default.\n\
                  \n\
                  Examples:\n\
                    localstore get language              # Resolve a setting\n\
                    localstore set music false           # Persist a setting\n\
                    localstore --defaults game.toml get difficulty\n\
                    localstore reset                     # Wipe every stored setting\n\
                  \n\
                  Environment Variables:\n\
                    LOCALSTORE_DB                        # Override database path\n\
                    LOCALSTORE_DEFAULTS                  # Defaults file (.json or .toml)\n\
                    RUST_LOG                             # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database path (default: <data dir>/localstore/local.db)
    #[arg(long, env = "LOCALSTORE_DB")]
    db: Option<PathBuf>,

    /// Defaults file (.json or .toml); built-in defaults otherwise
    #[arg(long, env = "LOCALSTORE_DEFAULTS")]
    defaults: Option<PathBuf>,

    /// Clear the database before running the command
    #[arg(long)]
    reset: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved value of a key
    Get {
        key: String,
        /// Fail for keys the defaults don't define
        #[arg(long)]
        strict: bool,
    },
    /// Store a value and wait until it is persisted
    Set { key: String, value: String },
    /// Clear every stored value
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let db = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };

    let config = match &cli.defaults {
        Some(path) => Configuration::load(path)
            .with_context(|| format!("Failed to load defaults from {}", path.display()))?,
        None => Configuration::default(),
    };

    let mut gate = VersionRegistry::new();
    if cli.reset || matches!(cli.command, Command::Reset) {
        gate.enable(RESET_LOCAL_FLAG);
    }

    let kv = SqliteKv::open(&db)
        .with_context(|| format!("Failed to open database {}", db.display()))?;
    let store = LocalStore::initialize(config, kv, &gate).context("Failed to initialize store")?;

    match cli.command {
        Command::Get { key, strict } => {
            let value = if strict {
                store.get_strict(&key)?
            } else {
                store.get(&key)
            };
            println!("{}", value);
        }
        Command::Set { key, value } => {
            store.set(key.as_str(), value);
            store.flush().await.context("Write-back worker stopped")?;

            let stats = store.stats();
            if stats.failed > 0 {
                anyhow::bail!("Failed to persist '{}' (see log output)", key);
            }
        }
        Command::Reset => {
            println!("Cleared {}", db.display());
        }
    }

    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("localstore").join("local.db"))
        .context("Could not determine data directory (use --db)")
}
