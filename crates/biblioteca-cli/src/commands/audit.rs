//! Audit log commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use biblioteca_core::config::AppConfig;
use biblioteca_core::error::AppError;
use biblioteca_core::types::pagination::PageRequest;
use biblioteca_entity::audit::AuditLogEntry;
use biblioteca_service::SessionContext;

use super::AdminContext;
use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Show recent audit entries, newest first
    List {
        /// Only entries recorded for this actor
        #[arg(short, long)]
        actor: Option<Uuid>,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Entries per page
        #[arg(short = 'n', long, default_value = "50")]
        per_page: u64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    seq: i64,
    time: String,
    actor: String,
    action: String,
    entity: String,
    name: String,
    details: String,
}

impl From<AuditLogEntry> for AuditRow {
    fn from(e: AuditLogEntry) -> Self {
        Self {
            seq: e.seq,
            time: e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            actor: e.actor_name,
            action: e.action.to_string(),
            entity: e.entity_type.to_string(),
            name: e.entity_name,
            details: e.details.unwrap_or_default(),
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = AdminContext::open(config).await?;
    let operator = SessionContext::system();

    match &args.command {
        AuditCommand::List {
            actor,
            page,
            per_page,
        } => {
            let request = PageRequest::new(*page, *per_page);
            let result = match actor {
                Some(actor_id) => ctx.audit.list_for_actor(&operator, *actor_id, &request).await?,
                None => ctx.audit.list_all(&operator, &request).await?,
            };
            let total = result.total_items;
            let pages = result.total_pages;
            let rows: Vec<AuditRow> = result.items.into_iter().map(AuditRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!("Page {page} of {pages} ({total} entries)");
            }
        }
    }

    ctx.store.close().await;
    Ok(())
}
