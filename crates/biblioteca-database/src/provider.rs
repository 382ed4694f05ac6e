//! Backend selection for all stores.

use std::sync::Arc;

use tracing::info;

use biblioteca_core::config::database::DatabaseConfig;
use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{
    AuditLogRepository, CategoryRepository, DocumentRepository, FolderRepository,
    IdentityRepository, TagRepository, UserRepository,
};
use crate::store::{
    AuditStore, CategoryStore, DocumentStore, FolderStore, IdentityStore, ProfileStore, TagStore,
};

/// Handles to every store, backed by the configured provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct DataStore {
    /// Authentication principals.
    pub identities: Arc<dyn IdentityStore>,
    /// User profiles.
    pub profiles: Arc<dyn ProfileStore>,
    /// Categories.
    pub categories: Arc<dyn CategoryStore>,
    /// Folders.
    pub folders: Arc<dyn FolderStore>,
    /// Documents.
    pub documents: Arc<dyn DocumentStore>,
    /// Tags.
    pub tags: Arc<dyn TagStore>,
    /// Audit log.
    pub audit: Arc<dyn AuditStore>,
    pool: Option<DatabasePool>,
}

impl DataStore {
    /// Create the stores from configuration, connecting (and migrating)
    /// PostgreSQL when selected.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL store provider");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Initializing in-memory store provider");
                Ok(Self::memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }

    /// Stores backed by an existing PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            identities: Arc::new(IdentityRepository::new(pg.clone())),
            profiles: Arc::new(UserRepository::new(pg.clone())),
            categories: Arc::new(CategoryRepository::new(pg.clone())),
            folders: Arc::new(FolderRepository::new(pg.clone())),
            documents: Arc::new(DocumentRepository::new(pg.clone())),
            tags: Arc::new(TagRepository::new(pg.clone())),
            audit: Arc::new(AuditLogRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-memory stores.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            identities: store.clone(),
            profiles: store.clone(),
            categories: store.clone(),
            folders: store.clone(),
            documents: store.clone(),
            tags: store.clone(),
            audit: store,
            pool: None,
        }
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Check backend connectivity.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblioteca_core::error::ErrorKind;

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let store = DataStore::connect(&DatabaseConfig::default()).await.unwrap();
        assert_eq!(store.provider_name(), "memory");
        assert!(store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = DatabaseConfig {
            provider: "mongodb".into(),
            ..Default::default()
        };
        let err = DataStore::connect(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
