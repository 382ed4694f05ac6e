//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use biblioteca_api::{AppState, build_app};
use biblioteca_core::config::AppConfig;
use biblioteca_database::DataStore;
use biblioteca_storage::ObjectStore;

/// A password strong enough for the registration checks.
pub const PASSWORD: &str = "Quiet-Lantern-Orchard-42";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the stores directly
    pub state: AppState,
    /// Keeps the object storage root alive for the test's duration
    _storage: TempDir,
}

/// A registered account and its current token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Response from a test request
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of a failure envelope.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    /// Create a new test application over the in-memory backend.
    pub async fn new() -> Self {
        let storage = TempDir::new().expect("Failed to create storage dir");

        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".into();
        config.storage.root_path = storage.path().to_string_lossy().into_owned();

        let objects = ObjectStore::from_config(&config.storage)
            .await
            .expect("Failed to init storage");
        let state = AppState::new(config, DataStore::memory(), objects);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            _storage: storage,
        }
    }

    /// Register an account; the first one registered becomes the admin.
    pub async fn register(&self, email: &str, name: &str) -> TestUser {
        let resp = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "display_name": name,
                })),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "register failed: {}", resp.body);
        Self::user_from_session(&resp)
    }

    /// Sign in and return a fresh token.
    pub async fn login(&self, email: &str) -> TestUser {
        let resp = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {}", resp.body);
        Self::user_from_session(&resp)
    }

    /// Exchange a token for one carrying the principal's current claims.
    pub async fn refresh(&self, token: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "token": token })),
            None,
        )
        .await
    }

    /// Assign `role` through the privileged callable.
    pub async fn set_role(&self, token: &str, uid: &str, role: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/callable/set-role",
            Some(json!({ "uid": uid, "role": role })),
            Some(token),
        )
        .await
    }

    /// Register the admin plus one user promoted to `role`, returning
    /// `(admin, promoted)` with tokens that carry the new claim.
    pub async fn admin_and(&self, role: &str) -> (TestUser, TestUser) {
        let admin = self.register("admin@uni.edu", "Admin").await;
        let other = self.register("member@uni.edu", "Member").await;
        if role != "User" {
            let resp = self.set_role(&admin.token, &other.id.to_string(), role).await;
            assert_eq!(resp.status, StatusCode::OK, "set-role failed: {}", resp.body);
        }
        let other = self.login("member@uni.edu").await;
        (admin, other)
    }

    /// Create a category and return its id.
    pub async fn create_category(&self, token: &str, name: &str) -> Uuid {
        let resp = self
            .request(
                "POST",
                "/api/categories",
                Some(json!({ "name": name })),
                Some(token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create category: {}", resp.body);
        id_of(resp.data())
    }

    /// Create a folder and return its id.
    pub async fn create_folder(
        &self,
        token: &str,
        category_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Uuid {
        let resp = self
            .request(
                "POST",
                "/api/folders",
                Some(json!({
                    "category_id": category_id,
                    "parent_id": parent_id,
                    "name": name,
                })),
                Some(token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create folder: {}", resp.body);
        id_of(resp.data())
    }

    /// Create a document and return the created record.
    pub async fn create_document(
        &self,
        token: &str,
        category_id: Uuid,
        folder_id: Option<Uuid>,
        title: &str,
    ) -> Value {
        let resp = self
            .request(
                "POST",
                "/api/documents",
                Some(json!({
                    "category_id": category_id,
                    "folder_id": folder_id,
                    "title": title,
                    "author": "Ada Lovelace",
                    "file_url": "http://localhost:8080/files/sample.pdf",
                })),
                Some(token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create document: {}", resp.body);
        resp.data().clone()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(b) => Body::from(serde_json::to_vec(&b).expect("Failed to encode body")),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(req.body(body).expect("Failed to build request"))
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    fn user_from_session(resp: &TestResponse) -> TestUser {
        let data = resp.data();
        TestUser {
            id: id_of(&data["identity"]["profile"]),
            token: data["token"]["token"]
                .as_str()
                .expect("token missing")
                .to_string(),
        }
    }
}

/// Parse the `id` field of a JSON record.
pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("no id in {value}"))
}
