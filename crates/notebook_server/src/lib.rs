//! HTTP request surface for the notebook service.
//!
//! # Responsibility
//! - Wire core services into an axum router.
//! - Keep transport concerns (status codes, JSON shapes) out of core.

pub mod config;
pub mod routes;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use routes::AppState;
use std::sync::Arc;
use std::time::Instant;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add_note", post(routes::add_note))
        .route("/get_notes", get(routes::get_notes))
        .route("/delete_note", post(routes::delete_note))
        .route("/delete_all_notes", post(routes::delete_all_notes))
        .route("/add_wiki_info", post(routes::add_links))
        .route("/topics", get(routes::list_topics))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    info!(
        "event=http_request module=http method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
