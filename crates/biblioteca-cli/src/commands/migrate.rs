//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use biblioteca_core::config::AppConfig;
use biblioteca_core::error::AppError;
use biblioteca_database::DatabasePool;
use biblioteca_database::migration::{migration_status, run_migrations};

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show which embedded migrations the database has applied
    Status,
}

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    version: i64,
    description: String,
    applied: String,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if config.database.provider != "postgres" {
        output::print_warning("The memory backend has no schema to migrate.");
        return Ok(());
    }
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let rows: Vec<MigrationRow> = migration_status(pool.pool())
                .await?
                .into_iter()
                .map(|m| MigrationRow {
                    version: m.version,
                    description: m.description,
                    applied: if m.applied { "yes" } else { "pending" }.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    pool.close().await;
    Ok(())
}
