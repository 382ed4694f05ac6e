//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use biblioteca_core::config::AppConfig;
use biblioteca_core::events::EventBus;
use biblioteca_database::DataStore;
use biblioteca_realtime::{LiveQueryEngine, ServiceSnapshots};
use biblioteca_service::{
    AdminUserService, AuditRecorder, AuthService, CategoryService, DocumentService, FolderService,
    IdentityResolver, TagService, UploadService, UserService,
};
use biblioteca_storage::ObjectStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Services are cheap
/// to clone; they hold `Arc`s to their stores.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Entity stores
    pub store: DataStore,
    /// Uploaded object storage
    pub objects: ObjectStore,
    /// Domain event bus
    pub events: EventBus,

    // ── Services ─────────────────────────────────────────────
    /// Registration, sign-in, token validation
    pub auth_service: AuthService,
    /// Own profile
    pub user_service: UserService,
    /// Role assignment and principal listing
    pub admin_user_service: AdminUserService,
    /// Categories
    pub category_service: CategoryService,
    /// Folders
    pub folder_service: FolderService,
    /// Documents
    pub document_service: DocumentService,
    /// Tags
    pub tag_service: TagService,
    /// File uploads and downloads
    pub upload_service: UploadService,
    /// Audit log
    pub audit: AuditRecorder,

    // ── Realtime ─────────────────────────────────────────────
    /// Live-query engine
    pub realtime: LiveQueryEngine,
}

impl AppState {
    /// Wire every service over the given stores. The live-query engine is
    /// created but not started; call [`LiveQueryEngine::start`] with
    /// `events` to begin pushing updates.
    pub fn new(config: AppConfig, store: DataStore, objects: ObjectStore) -> Self {
        let events = EventBus::new(config.realtime.event_buffer_size);
        let audit = AuditRecorder::new(store.audit.clone(), events.clone());

        let resolver = IdentityResolver::new(store.profiles.clone(), events.clone());
        let auth_service = AuthService::new(store.identities.clone(), resolver, &config.auth);
        let user_service =
            UserService::new(store.profiles.clone(), audit.clone(), events.clone());
        let admin_user_service = AdminUserService::new(
            store.identities.clone(),
            store.profiles.clone(),
            audit.clone(),
            events.clone(),
        );

        let category_service =
            CategoryService::new(store.categories.clone(), audit.clone(), events.clone());
        let folder_service = FolderService::new(
            store.folders.clone(),
            store.categories.clone(),
            audit.clone(),
            events.clone(),
        );
        let document_service = DocumentService::new(
            store.documents.clone(),
            store.categories.clone(),
            store.folders.clone(),
            store.tags.clone(),
            objects.clone(),
            audit.clone(),
            events.clone(),
        );
        let tag_service = TagService::new(
            store.tags.clone(),
            store.documents.clone(),
            audit.clone(),
            events.clone(),
        );
        let upload_service = UploadService::new(objects.clone(), events.clone());

        let snapshots = ServiceSnapshots::new(
            category_service.clone(),
            folder_service.clone(),
            document_service.clone(),
            tag_service.clone(),
            admin_user_service.clone(),
            audit.clone(),
        );
        let realtime = LiveQueryEngine::new(config.realtime.clone(), Arc::new(snapshots));

        Self {
            config: Arc::new(config),
            store,
            objects,
            events,
            auth_service,
            user_service,
            admin_user_service,
            category_service,
            folder_service,
            document_service,
            tag_service,
            upload_service,
            audit,
            realtime,
        }
    }
}
