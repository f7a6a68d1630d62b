//! Status endpoint: a small read-only HTTP surface over the running scheduler.
//!
//! - GET /health  - aggregated health, 200 when healthy and 503 otherwise
//! - GET /status  - per-platform scheduler state

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use storewatch_scheduler::Scheduler;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(scheduler: Scheduler) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(scheduler)
}

/// Bind the listener. Split from [`serve`] so a bad port fails startup.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

/// Serve until `shutdown` flips to `true`.
pub async fn serve(
    listener: TcpListener,
    scheduler: Scheduler,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "status endpoint listening");
    }
    axum::serve(listener, router(scheduler))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
}

async fn handle_health(State(scheduler): State<Scheduler>) -> impl IntoResponse {
    let report = scheduler.health().await;
    let code = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

async fn handle_status(State(scheduler): State<Scheduler>) -> impl IntoResponse {
    Json(scheduler.status().await)
}

async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not found"})),
    )
}
