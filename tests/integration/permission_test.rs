//! Integration tests for role and ownership based authorization.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, id_of};

#[tokio::test]
async fn test_plain_user_cannot_manage_categories() {
    let app = TestApp::new().await;
    let (admin, user) = app.admin_and("User").await;

    let resp = app
        .request("POST", "/api/categories", Some(json!({ "name": "Art" })), Some(&user.token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_code(), "PERMISSION_DENIED");

    let cat = app.create_category(&admin.token, "Art").await;
    let resp = app
        .request(
            "PUT",
            &format!("/api/categories/{cat}"),
            Some(json!({ "name": "Fine Art" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    // Reading is open to everyone signed in.
    let resp = app.request("GET", "/api/categories", None, Some(&user.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_editor_manages_categories() {
    let app = TestApp::new().await;
    let (_admin, editor) = app.admin_and("Editor").await;

    let cat = app.create_category(&editor.token, "Music").await;
    let resp = app
        .request(
            "PUT",
            &format!("/api/categories/{cat}"),
            Some(json!({ "name": "Musicology", "description": "Theory and history" })),
            Some(&editor.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.data()["name"], "Musicology");
}

#[tokio::test]
async fn test_owner_edits_own_document_but_not_others() {
    let app = TestApp::new().await;
    let (admin, user) = app.admin_and("User").await;
    let cat = app.create_category(&admin.token, "Economics").await;

    let own = id_of(&app.create_document(&user.token, cat, None, "My Thesis").await);
    let theirs = id_of(&app.create_document(&admin.token, cat, None, "Admin Report").await);

    let resp = app
        .request(
            "PUT",
            &format!("/api/documents/{own}"),
            Some(json!({ "title": "My Final Thesis" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["title"], "My Final Thesis");

    let resp = app
        .request(
            "PUT",
            &format!("/api/documents/{theirs}"),
            Some(json!({ "title": "Defaced" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .request("DELETE", &format!("/api/documents/{theirs}"), None, Some(&user.token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .request("GET", &format!("/api/documents/{theirs}"), None, Some(&user.token))
        .await;
    assert_eq!(resp.data()["title"], "Admin Report");
}

#[tokio::test]
async fn test_editor_edits_any_document() {
    let app = TestApp::new().await;
    let (admin, editor) = app.admin_and("Editor").await;
    let cat = app.create_category(&admin.token, "Law").await;
    let doc = id_of(&app.create_document(&admin.token, cat, None, "Contracts").await);

    let resp = app
        .request(
            "PUT",
            &format!("/api/documents/{doc}"),
            Some(json!({ "author": "R. Posner" })),
            Some(&editor.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["author"], "R. Posner");
}

#[tokio::test]
async fn test_folder_rename_requires_ownership() {
    let app = TestApp::new().await;
    let (admin, user) = app.admin_and("User").await;
    let cat = app.create_category(&admin.token, "Geography").await;
    let admin_folder = app.create_folder(&admin.token, cat, None, "Maps").await;
    let own_folder = app.create_folder(&user.token, cat, None, "Field Notes").await;

    let resp = app
        .request(
            "PUT",
            &format!("/api/folders/{admin_folder}"),
            Some(json!({ "name": "Atlases" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .request(
            "PUT",
            &format!("/api/folders/{own_folder}"),
            Some(json!({ "name": "Field Journal" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "Field Journal");
}

#[tokio::test]
async fn test_audit_visibility() {
    let app = TestApp::new().await;
    let (admin, user) = app.admin_and("User").await;
    let cat = app.create_category(&admin.token, "Philosophy").await;
    app.create_document(&user.token, cat, None, "Meditations").await;

    let resp = app.request("GET", "/api/audit", None, Some(&user.token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .request("GET", &format!("/api/audit/users/{}", admin.id), None, Some(&user.token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.request("GET", "/api/audit/me", None, Some(&user.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let mine = resp.data()["items"].as_array().unwrap();
    assert!(!mine.is_empty());
    assert!(mine.iter().all(|e| e["actor_id"] == user.id.to_string()));

    let resp = app
        .request("GET", &format!("/api/audit/users/{}", user.id), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["items"].as_array().unwrap().len(), mine.len());
}

#[tokio::test]
async fn test_requests_without_token_rejected() {
    let app = TestApp::new().await;
    for path in ["/api/categories", "/api/documents", "/api/tags", "/api/auth/me"] {
        let resp = app.request("GET", path, None, None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(resp.error_code(), "UNAUTHENTICATED");
    }

    let resp = app
        .request("GET", "/api/categories", None, Some("not-a-token"))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let resp = app.request("GET", "/api/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["database"], "memory");
}
