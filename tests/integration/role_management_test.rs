//! Integration tests for the role-assignment callable and principal listing.

mod helpers;

use axum::http::StatusCode;
use helpers::TestApp;

#[tokio::test]
async fn test_admin_assigns_role() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let member = app.register("ana@uni.edu", "Ana").await;

    let resp = app
        .set_role(&admin.token, &member.id.to_string(), "Editor")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["status"], "success");
    assert_eq!(
        resp.data()["message"],
        format!("Role Editor assigned to user {}", member.id)
    );

    let member = app.login("ana@uni.edu").await;
    let me = app.request("GET", "/api/auth/me", None, Some(&member.token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["role"], "Editor");
    assert_eq!(me.data()["profile"]["role"], "Editor");
}

#[tokio::test]
async fn test_non_admin_cannot_assign_roles() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let member = app.register("ana@uni.edu", "Ana").await;

    let resp = app
        .set_role(&member.token, &admin.id.to_string(), "User")
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_code(), "PERMISSION_DENIED");

    // The admin is untouched and still holds a valid token.
    let me = app.request("GET", "/api/auth/me", None, Some(&admin.token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["role"], "Admin");
}

#[tokio::test]
async fn test_editor_cannot_assign_roles() {
    let app = TestApp::new().await;
    let (_admin, editor) = app.admin_and("Editor").await;

    let resp = app
        .set_role(&editor.token, &editor.id.to_string(), "Admin")
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_arguments_rejected() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let member = app.register("ana@uni.edu", "Ana").await;

    let resp = app
        .set_role(&admin.token, &member.id.to_string(), "SuperAdmin")
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION_ERROR");

    let resp = app.set_role(&admin.token, "user123", "Editor").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code(), "NOT_FOUND");

    let resp = app.set_role(&admin.token, "", "Editor").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .set_role(&admin.token, &uuid::Uuid::new_v4().to_string(), "Editor")
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unauthenticated_call_rejected() {
    let app = TestApp::new().await;
    let resp = app
        .request(
            "POST",
            "/api/callable/set-role",
            Some(serde_json::json!({ "uid": "x", "role": "Admin" })),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_change_invalidates_old_token_until_refresh() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let member = app.register("ana@uni.edu", "Ana").await;

    let resp = app
        .set_role(&admin.token, &member.id.to_string(), "Editor")
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let stale = app
        .request("GET", "/api/auth/me", None, Some(&member.token))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let refreshed = app.refresh(&member.token).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert_eq!(refreshed.data()["identity"]["role"], "Editor");
    let token = refreshed.data()["token"]["token"].as_str().unwrap().to_string();

    let me = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["role"], "Editor");
}

#[tokio::test]
async fn test_role_change_is_audited() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let member = app.register("ana@uni.edu", "Ana").await;
    app.set_role(&admin.token, &member.id.to_string(), "Editor")
        .await;

    let resp = app.request("GET", "/api/audit", None, Some(&admin.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.data()["items"].as_array().unwrap();
    let entry = items
        .iter()
        .find(|e| e["action"] == "role_change")
        .expect("role change entry");
    assert_eq!(entry["entity_id"], member.id.to_string());
    assert_eq!(entry["actor_id"], admin.id.to_string());
}

#[tokio::test]
async fn test_admin_lists_principals() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    for i in 0..5 {
        app.register(&format!("user{i}@uni.edu"), &format!("User {i}"))
            .await;
    }

    // A batch size smaller than the population still returns everyone.
    let resp = app
        .request("GET", "/api/admin/principals?limit=2", None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let principals = resp.data().as_array().unwrap();
    assert_eq!(principals.len(), 6);
    let admin_record = principals
        .iter()
        .find(|p| p["uid"] == admin.id.to_string())
        .unwrap();
    assert_eq!(admin_record["role"], "Admin");
    assert!(
        principals
            .iter()
            .filter(|p| p["uid"] != admin.id.to_string())
            .all(|p| p["role"] == "User")
    );
}

#[tokio::test]
async fn test_principal_listing_requires_admin() {
    let app = TestApp::new().await;
    let (_admin, editor) = app.admin_and("Editor").await;

    let resp = app
        .request("GET", "/api/admin/principals", None, Some(&editor.token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .request("GET", "/api/admin/users", None, Some(&editor.token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_promotion_survives_later_non_admin_attempt() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let target = app.register("ana@uni.edu", "Ana").await;
    let bystander = app.register("ben@uni.edu", "Ben").await;

    let resp = app
        .set_role(&admin.token, &target.id.to_string(), "Editor")
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .set_role(&bystander.token, &target.id.to_string(), "User")
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .request("GET", "/api/admin/principals", None, Some(&admin.token))
        .await;
    let record = resp
        .data()
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["uid"] == target.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(record["role"], "Editor");
}
