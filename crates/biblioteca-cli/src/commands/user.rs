//! Principal and role management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use biblioteca_core::config::AppConfig;
use biblioteca_core::error::AppError;
use biblioteca_entity::user::UserRole;
use biblioteca_service::SessionContext;
use biblioteca_service::user::PrincipalRecord;

use super::AdminContext;
use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List every registered principal with its role
    List {
        /// Only show principals holding this role
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Assign a role to a principal
    SetRole {
        /// User id or email address
        user: String,
        /// Admin, Editor, or User
        role: String,
        /// Skip the confirmation prompt when granting Admin
        #[arg(long)]
        yes: bool,
    },
}

/// Principal display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PrincipalRow {
    uid: String,
    email: String,
    name: String,
    role: String,
    registered: String,
}

impl From<PrincipalRecord> for PrincipalRow {
    fn from(p: PrincipalRecord) -> Self {
        Self {
            uid: p.uid.to_string(),
            email: p.email,
            name: p.display_name.unwrap_or_default(),
            role: p.role.to_string(),
            registered: p.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = AdminContext::open(config).await?;
    let operator = SessionContext::system();

    match &args.command {
        UserCommand::List { role } => {
            let role = role.as_deref().map(str::parse::<UserRole>).transpose()?;
            let rows: Vec<PrincipalRow> = ctx
                .users
                .list_principals(&operator, None)
                .await?
                .into_iter()
                .filter(|p| role.is_none_or(|r| p.role == r))
                .map(PrincipalRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::SetRole { user, role, yes } => {
            let uid = resolve_uid(&ctx, user).await?;
            if role == UserRole::Admin.as_str() && !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Grant Admin to {user}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let resp = ctx.users.set_role(&operator, &uid, role).await?;
            output::print_success(&resp.message);
            output::print_warning("The user must sign in again or refresh their token.");
        }
    }

    ctx.store.close().await;
    Ok(())
}

/// Accept either a user id or an email address.
async fn resolve_uid(ctx: &AdminContext, user: &str) -> Result<String, AppError> {
    if Uuid::parse_str(user).is_ok() || !user.contains('@') {
        return Ok(user.to_string());
    }
    let identity = ctx
        .store
        .identities
        .find_by_email(&user.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found(format!("No user with email '{user}'")))?;
    Ok(identity.id.to_string())
}
