use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use focus_server::{router, UserRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "focus_server.db".to_string());
    let addr = std::env::var("FOCUS_SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let repo = Arc::new(UserRepository::new(&database_url)?);
    let app = router(repo);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(target: "http", "listening on {addr} (db: {database_url})");
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
