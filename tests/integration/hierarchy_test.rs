//! Integration tests for the category, folder, and document hierarchy.

mod helpers;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::json;

use helpers::{TestApp, id_of};

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a timestamp: {value}"))
}

#[tokio::test]
async fn test_folder_with_documents_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let cat = app.create_category(&admin.token, "Mathematics").await;
    let folder = app.create_folder(&admin.token, cat, None, "Algebra").await;
    let doc = app
        .create_document(&admin.token, cat, Some(folder), "Linear Algebra Notes")
        .await;

    let resp = app
        .request("DELETE", &format!("/api/folders/{folder}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_code(), "HIERARCHY_VIOLATION");

    // Once the document is gone the folder can go too.
    let resp = app
        .request(
            "DELETE",
            &format!("/api/documents/{}", id_of(&doc)),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = app
        .request("DELETE", &format!("/api/folders/{folder}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .request("GET", &format!("/api/folders/{folder}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_parent_leaves_subfolder_reachable_by_id() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let cat = app.create_category(&admin.token, "Physics").await;
    let parent = app.create_folder(&admin.token, cat, None, "Mechanics").await;
    let child = app
        .create_folder(&admin.token, cat, Some(parent), "Kinematics")
        .await;

    let resp = app
        .request("DELETE", &format!("/api/folders/{parent}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .request("GET", &format!("/api/folders/{child}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["parent_id"], parent.to_string());

    // The orphan is not listed among the category's root folders.
    let resp = app
        .request("GET", &format!("/api/categories/{cat}/folders"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.data().as_array().unwrap().is_empty());

    let resp = app
        .request("GET", &format!("/api/folders/{child}/path"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["truncated"], true);
    assert_eq!(resp.data()["segments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_move_document_updates_location() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let math = app.create_category(&admin.token, "Mathematics").await;
    let cs = app.create_category(&admin.token, "Computer Science").await;
    let target = app.create_folder(&admin.token, cs, None, "Algorithms").await;
    let doc = app.create_document(&admin.token, math, None, "Graph Theory").await;
    let doc_id = id_of(&doc);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let resp = app
        .request(
            "PUT",
            &format!("/api/documents/{doc_id}/move"),
            Some(json!({ "category_id": cs, "folder_id": target })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.data()["category_id"], cs.to_string());
    assert_eq!(resp.data()["folder_id"], target.to_string());
    assert!(timestamp(&resp.data()["last_updated"]) > timestamp(&doc["last_updated"]));

    let resp = app
        .request("GET", &format!("/api/folders/{target}/documents"), None, Some(&admin.token))
        .await;
    let listed = resp.data().as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(id_of(&listed[0]), doc_id);

    let resp = app
        .request("GET", &format!("/api/categories/{math}/documents"), None, Some(&admin.token))
        .await;
    assert!(resp.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_move_into_folder_of_other_category_rejected() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let math = app.create_category(&admin.token, "Mathematics").await;
    let cs = app.create_category(&admin.token, "Computer Science").await;
    let cs_folder = app.create_folder(&admin.token, cs, None, "Compilers").await;
    let doc = app.create_document(&admin.token, math, None, "Set Theory").await;
    let doc_id = id_of(&doc);

    let resp = app
        .request(
            "PUT",
            &format!("/api/documents/{doc_id}/move"),
            Some(json!({ "category_id": math, "folder_id": cs_folder })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_code(), "HIERARCHY_VIOLATION");

    let resp = app
        .request("GET", &format!("/api/documents/{doc_id}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.data()["category_id"], math.to_string());
    assert!(resp.data()["folder_id"].is_null());
}

#[tokio::test]
async fn test_subfolder_must_share_parent_category() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let math = app.create_category(&admin.token, "Mathematics").await;
    let cs = app.create_category(&admin.token, "Computer Science").await;
    let parent = app.create_folder(&admin.token, math, None, "Calculus").await;

    let resp = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "category_id": cs, "parent_id": parent, "name": "Limits" })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_path_lists_ancestors_first() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let cat = app.create_category(&admin.token, "History").await;
    let a = app.create_folder(&admin.token, cat, None, "Europe").await;
    let b = app.create_folder(&admin.token, cat, Some(a), "Medieval").await;
    let c = app.create_folder(&admin.token, cat, Some(b), "Crusades").await;

    let resp = app
        .request("GET", &format!("/api/folders/{c}/path"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["category_id"], cat.to_string());
    assert_eq!(resp.data()["truncated"], false);
    let names: Vec<&str> = resp.data()["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Europe", "Medieval", "Crusades"]);

    let resp = app
        .request("GET", &format!("/api/folders/{a}/children"), None, Some(&admin.token))
        .await;
    let children = resp.data().as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(id_of(&children[0]), b);
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let cat = app.create_category(&admin.token, "Biology").await;
    app.create_document(&admin.token, cat, None, "Cell Structure").await;

    let resp = app
        .request("DELETE", &format!("/api/categories/{cat}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let empty = app.create_category(&admin.token, "Chemistry").await;
    let resp = app
        .request("DELETE", &format!("/api/categories/{empty}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleting_tag_strips_it_from_documents() {
    let app = TestApp::new().await;
    let admin = app.register("admin@uni.edu", "Admin").await;
    let cat = app.create_category(&admin.token, "Literature").await;

    let resp = app
        .request("POST", "/api/tags", Some(json!({ "name": "classic" })), Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let tag = id_of(resp.data());

    let doc = app.create_document(&admin.token, cat, None, "Don Quixote").await;
    let doc_id = id_of(&doc);
    let resp = app
        .request(
            "PUT",
            &format!("/api/documents/{doc_id}"),
            Some(json!({ "tag_ids": [tag] })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.data()["tag_ids"], json!([tag]));

    let resp = app
        .request("DELETE", &format!("/api/tags/{tag}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .request("GET", &format!("/api/documents/{doc_id}"), None, Some(&admin.token))
        .await;
    assert_eq!(resp.data()["tag_ids"], json!([]));
}
