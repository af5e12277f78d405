//! Placeholder CRUD routes under `/api`. No authentication, no authorization;
//! every request passes the logging middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::task;
use tracing::info;

use crate::db::{NewUser, UserRepository};
use crate::error::ApiError;

pub type SharedRepo = Arc<UserRepository>;

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
}

pub fn router(repo: SharedRepo) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
        .layer(middleware::from_fn(log_requests))
        .with_state(repo)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(req).await;
    info!(
        target: "http",
        %method,
        path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn create_user(
    State(repo): State<SharedRepo>,
    Json(req): Json<CreateUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(move || {
        repo.create(NewUser {
            username: req.username,
            password: req.password,
        })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(user.to_api())))
}

async fn list_users(State(repo): State<SharedRepo>) -> Result<impl IntoResponse, ApiError> {
    let users = run_blocking(move || repo.list()).await?;
    let out: Vec<_> = users.iter().map(|u| u.to_api()).collect();
    Ok(Json(out))
}

async fn get_user(
    State(repo): State<SharedRepo>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(move || repo.get(id)).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.to_api()))
}

async fn delete_user(
    State(repo): State<SharedRepo>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    if run_blocking(move || repo.delete(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// The diesel connection is synchronous; run repository calls on the
/// blocking pool so handlers never block the runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task: {e}")))?
}
