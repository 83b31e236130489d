mod common;

use axum::Router;
use axum::http::StatusCode;
use axum_test::TestServer;
use course_categories::api::routes::api_routes;
use serde_json::{Value, json};

fn make_server() -> TestServer {
    let (state, _repo, _cache) = common::create_test_state();
    let app = Router::new().nest("/api", api_routes()).with_state(state);
    TestServer::new(app).unwrap()
}

async fn create_category(server: &TestServer, name: &str, parent_id: Option<i64>) -> Value {
    let response = server
        .post("/api/categories")
        .json(&json!({ "name": name, "parent_id": parent_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_category_success() {
    let server = make_server();

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "Web Development", "description": "All things web" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["name"], "Web Development");
    assert_eq!(body["slug"], "web-development");
    assert_eq!(body["display_order"], 0);
    assert_eq!(body["parent_id"], Value::Null);
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn test_create_category_empty_string_parent_is_root() {
    let server = make_server();

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "Rooted", "parent_id": "" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["parent_id"], Value::Null);
}

#[tokio::test]
async fn test_create_category_name_too_short() {
    let server = make_server();

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "X" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_create_category_unknown_parent() {
    let server = make_server();

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "Orphan", "parent_id": 999 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_sibling_appends_display_order() {
    let server = make_server();

    create_category(&server, "First", None).await;
    let second = create_category(&server, "Second", None).await;

    assert_eq!(second["display_order"], 1);
}

// ─── READ ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_category_by_id_and_slug() {
    let server = make_server();

    let created = create_category(&server, "Machine Learning", None).await;
    let id = created["id"].as_i64().unwrap();

    let response = server.get(&format!("/api/categories/{id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["slug"], "machine-learning");

    let response = server.get("/api/categories/slug/machine-learning").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], id);
}

#[tokio::test]
async fn test_get_category_not_found() {
    let server = make_server();

    server
        .get("/api/categories/12345")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .get("/api/categories/slug/nope")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_categories_with_filters() {
    let server = make_server();

    let root = create_category(&server, "Root", None).await;
    let root_id = root["id"].as_i64().unwrap();
    create_category(&server, "Child", Some(root_id)).await;

    let response = server.get("/api/categories").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 2);

    let response = server.get("/api/categories?parent_id=root").await;
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Root");

    let response = server
        .get(&format!("/api/categories?parent_id={root_id}"))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Child");
}

#[tokio::test]
async fn test_list_categories_bad_pagination() {
    let server = make_server();

    server
        .get("/api/categories?page=0")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/api/categories?limit=500")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hierarchy_nests_children() {
    let server = make_server();

    let root = create_category(&server, "Root", None).await;
    let root_id = root["id"].as_i64().unwrap();
    create_category(&server, "Leaf", Some(root_id)).await;

    let response = server.get("/api/categories/hierarchy").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let forest = body.as_array().unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0]["name"], "Root");
    assert_eq!(forest[0]["children"][0]["name"], "Leaf");
}

// ─── UPDATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_category_rename_changes_slug() {
    let server = make_server();

    let created = create_category(&server, "Old Title", None).await;
    let id = created["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/categories/{id}"))
        .json(&json!({ "name": "New Title" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["slug"], "new-title");
}

#[tokio::test]
async fn test_update_category_self_parent_rejected() {
    let server = make_server();

    let created = create_category(&server, "Selfie", None).await;
    let id = created["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/categories/{id}"))
        .json(&json!({ "parent_id": id }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_category_cycle_rejected() {
    let server = make_server();

    let a = create_category(&server, "A", None).await;
    let a_id = a["id"].as_i64().unwrap();
    let b = create_category(&server, "B", Some(a_id)).await;
    let b_id = b["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/categories/{a_id}"))
        .json(&json!({ "parent_id": b_id }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_category_move_to_root_with_null() {
    let server = make_server();

    let parent = create_category(&server, "Parent", None).await;
    let parent_id = parent["id"].as_i64().unwrap();
    let child = create_category(&server, "Child", Some(parent_id)).await;
    let child_id = child["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/categories/{child_id}"))
        .json(&json!({ "parent_id": null }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["parent_id"], Value::Null);
    assert_eq!(body["display_order"], 1);
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_category() {
    let server = make_server();

    let created = create_category(&server, "Doomed", None).await;
    let id = created["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/categories/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/categories/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_category_not_found() {
    let server = make_server();

    server
        .delete("/api/categories/4242")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
