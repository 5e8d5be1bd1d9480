//! Command-line interface for the `ridematch-auth` binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use ridematch_auth::RefreshTokenStore;
use ridematch_core::Settings;
use ridematch_redis::RedisTokenStore;
use ridematch_storage::{PgUserStore, UserStore, migrations};

use crate::Result;
use crate::server;
use crate::state::AppState;

/// RideMatch auth service
#[derive(Parser, Debug)]
#[command(name = "ridematch-auth", version)]
#[command(about = "RideMatch authentication and user profile service", long_about = None)]
pub struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "RIDEMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Use in-memory stores instead of PostgreSQL and Redis
        #[arg(long)]
        memory: bool,
    },
    /// Apply or revert database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `migrate` subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Revert all migrations
    Down,
}

/// `config` subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved settings with secrets redacted
    Show,
    /// Print the settings file in use
    Path,
}

impl Cli {
    /// Dispatch the parsed command.
    pub async fn run(self) -> Result<()> {
        let config = self.config.as_deref();
        match self.command.unwrap_or(Command::Serve { memory: false }) {
            Command::Serve { memory } => cmd_serve(config, memory).await,
            Command::Migrate { action } => cmd_migrate(config, action).await,
            Command::Config { action } => cmd_config(config, action),
        }
    }
}

/// Start the server over PostgreSQL and Redis, or in-memory stores.
pub async fn cmd_serve(config: Option<&Path>, memory: bool) -> Result<()> {
    let settings = Settings::load(config)?;

    if memory {
        log::warn!("Running on in-memory stores; data is lost on exit");
        return server::serve(AppState::in_memory(settings)?).await;
    }

    let users = PgUserStore::connect_lazy(&settings)?;
    match users.ping().await {
        Ok(()) => log::info!("✓ Database connected"),
        Err(e) => log::error!("✗ Database connection failed: {e}"),
    }

    let tokens = token_store(&settings)?;
    match tokens.ping().await {
        Ok(()) => log::info!("✓ Redis connected"),
        Err(e) => log::error!("✗ Redis connection failed: {e}"),
    }

    let state = AppState::new(settings, Arc::new(users.clone()), Arc::new(tokens))?;
    let result = server::serve(state).await;

    users.close().await;
    log::info!("Database connections closed");
    result
}

/// Refresh-token store for the configured Redis. Only the URL is checked;
/// the connection is made on first use, so an unreachable server leaves the
/// service running in a degraded state.
pub fn token_store(settings: &Settings) -> Result<RedisTokenStore> {
    Ok(RedisTokenStore::new(&settings.redis_url())?)
}

/// Apply or revert the embedded migrations.
pub async fn cmd_migrate(config: Option<&Path>, action: MigrateAction) -> Result<()> {
    let settings = Settings::load(config)?;
    let store = PgUserStore::connect_lazy(&settings)?;

    let result = match action {
        MigrateAction::Up => migrations::run_migrations(store.pool()).await,
        MigrateAction::Down => migrations::revert_migrations(store.pool()).await,
    };
    store.close().await;
    Ok(result?)
}

/// Show settings or the settings file path.
pub fn cmd_config(config: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load(config)?;
            print!("{}", settings.to_redacted_toml()?);
        }
        ConfigAction::Path => {
            let explicit = config.map(|p| p.to_string_lossy().into_owned());
            match Settings::resolve_config_path(explicit.as_deref()) {
                Some(path) => {
                    println!("{}", path.display());
                    if !path.exists() {
                        eprintln!("(file does not exist; defaults and environment apply)");
                    }
                }
                None => println!("(none: using defaults and environment)"),
            }
        }
    }
    Ok(())
}
