//! Configuration inspection commands.

use clap::{Args, Subcommand};

use biblioteca_core::config::AppConfig;
use biblioteca_core::error::AppError;

use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration with secrets masked
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            println!("Server");
            output::print_kv("address", &format!("{}:{}", config.server.host, config.server.port));
            output::print_kv("cors origins", &config.server.cors.allowed_origins.join(", "));
            println!("Database");
            output::print_kv("provider", &config.database.provider);
            output::print_kv("url", &mask_url(&config.database.url));
            output::print_kv("run migrations", &config.database.run_migrations.to_string());
            println!("Auth");
            output::print_kv("jwt secret", "********");
            output::print_kv("token ttl (min)", &config.auth.token_ttl_minutes.to_string());
            output::print_kv("refresh window (h)", &config.auth.refresh_window_hours.to_string());
            println!("Storage");
            output::print_kv("root", &config.storage.root_path);
            output::print_kv("public url", &config.storage.public_base_url);
            output::print_kv("max upload (bytes)", &config.storage.max_upload_size_bytes.to_string());
            println!("Realtime");
            output::print_kv("ping interval (s)", &config.realtime.ping_interval_seconds.to_string());
            output::print_kv(
                "max subscriptions",
                &config.realtime.max_subscriptions_per_connection.to_string(),
            );
            println!("Logging");
            output::print_kv("level", &config.logging.level);
            output::print_kv("format", &config.logging.format);
        }
    }
    Ok(())
}

/// Hide the password part of a connection URL.
fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            let creds = &url[scheme + 3..at];
            match creds.split_once(':') {
                Some((user, _)) => format!("{}{user}:****{}", &url[..scheme + 3], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
