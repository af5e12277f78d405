use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use focus_server::{router, UserRepository};

fn test_router() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("api.db");
    let repo = Arc::new(UserRepository::new(db_path.to_str().unwrap()).expect("repo"));
    (dir, router(repo))
}

fn post_user(name: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": name, "password": "pw" }).to_string(),
        ))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let (_dir, app) = test_router();
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_then_list_users() {
    let (_dir, app) = test_router();

    let response = app.clone().oneshot(post_user("alice")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["username"], "alice");
    assert!(created.get("password").is_none());

    let response = app
        .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_username_returns_conflict() {
    let (_dir, app) = test_router();
    assert_eq!(
        app.clone().oneshot(post_user("bob")).await.unwrap().status(),
        StatusCode::CREATED
    );
    let response = app.oneshot(post_user("bob")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "username already taken" })
    );
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let (_dir, app) = test_router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_and_then_404s() {
    let (_dir, app) = test_router();
    let response = app.clone().oneshot(post_user("temp")).await.unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let delete = |id: i64| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/users/{id}"))
            .body(Body::empty())
            .unwrap()
    };
    let response = app.clone().oneshot(delete(id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.oneshot(delete(id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
