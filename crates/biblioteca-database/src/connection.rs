//! PostgreSQL pool for the `postgres` provider.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use biblioteca_core::config::database::DatabaseConfig;
use biblioteca_core::error::{AppError, ErrorKind};
use biblioteca_core::result::AppResult;

use crate::repositories::db_error;

/// Reported to the server as `application_name`, visible in `pg_stat_activity`.
const APPLICATION_NAME: &str = "biblioteca";

/// A connected sqlx pool shared by every repository.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`. Connections are verified on
    /// checkout so a restarted server does not surface as request errors.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(config)?;
        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or_default(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!(size = pool.size(), "PostgreSQL pool ready");
        Ok(Self { pool })
    }

    /// The sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> AppResult<bool> {
        let one = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Database health check failed"))?;
        Ok(one == 1)
    }

    /// Close all connections, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Parse `database.url` into connect options tagged with our application name.
fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    if config.url.trim().is_empty() {
        return Err(AppError::configuration(
            "database.url must be set when database.provider = \"postgres\"",
        ));
    }
    let options: PgConnectOptions = config.url.parse().map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid PostgreSQL URL",
            e,
        )
    })?;
    Ok(options.application_name(APPLICATION_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            provider: "postgres".into(),
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_connect_options_from_url() {
        let options = connect_options(&config("postgres://lib:secret@db:5433/biblioteca")).unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("biblioteca"));
        assert_eq!(options.get_application_name(), Some(APPLICATION_NAME));
    }

    #[test]
    fn test_malformed_url_is_configuration_error() {
        let err = connect_options(&config("postgres://lib:secret@db:notaport/x")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_connect_requires_url() {
        let err = DatabasePool::connect(&config("  ")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
