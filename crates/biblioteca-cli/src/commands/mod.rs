//! CLI command definitions and dispatch.

pub mod audit;
pub mod config;
pub mod migrate;
pub mod user;

use clap::{Parser, Subcommand};

use biblioteca_core::config::AppConfig;
use biblioteca_core::error::AppError;
use biblioteca_core::events::EventBus;
use biblioteca_database::DataStore;
use biblioteca_service::{AdminUserService, AuditRecorder};

use crate::output::OutputFormat;

/// Biblioteca: virtual document library administration
#[derive(Debug, Parser)]
#[command(name = "biblioteca", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/<env>.toml` is layered on top of the defaults)
    #[arg(short, long, env = "BIBLIOTECA_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Principals and roles
    User(user::UserArgs),
    /// Audit log
    Audit(audit::AuditArgs),
    /// Effective configuration
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Audit(args) => audit::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config),
        }
    }
}

/// Services the administrative commands run against.
pub struct AdminContext {
    pub store: DataStore,
    pub users: AdminUserService,
    pub audit: AuditRecorder,
}

impl AdminContext {
    /// Connect to the configured database. The in-memory backend holds no
    /// data between processes, so it is refused here.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        if config.database.provider != "postgres" {
            return Err(AppError::configuration(format!(
                "Administrative commands need a persistent database; provider is '{}'",
                config.database.provider
            )));
        }
        let store = DataStore::connect(&config.database).await?;
        let events = EventBus::new(config.realtime.event_buffer_size);
        let audit = AuditRecorder::new(store.audit.clone(), events.clone());
        let users = AdminUserService::new(
            store.identities.clone(),
            store.profiles.clone(),
            audit.clone(),
            events,
        );
        Ok(Self { store, users, audit })
    }
}
