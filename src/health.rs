//! Liveness endpoint for the hosting platform's probe.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;

pub const STATUS_MESSAGE: &str = "Discord bot is running!";

#[derive(Serialize)]
struct StatusResponse {
    message: &'static str,
}

/// `GET /` and, through axum's implicit handling, `HEAD /`.
pub fn router() -> Router {
    Router::new().route("/", get(handle_root))
}

async fn handle_root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: STATUS_MESSAGE,
    })
}

/// Serves the liveness endpoint until the listener fails.
pub async fn serve(host: &str, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Health endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
