//! API route definitions

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::{handlers, state::AppState, ServerConfig};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Visit / for the upload form or /api/health for API status.",
        })),
    )
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .fallback(handle_404);

    let mut app = Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .nest("/api", api_routes)
        .fallback(handle_404);

    // Uploads (and generated reports) are served back from predictable
    // static paths, as are the per-disease example images.
    app = app
        .nest_service("/static/uploads", ServeDir::new(&config.upload_dir))
        .nest_service(
            "/static/disease_examples",
            ServeDir::new(&config.examples_dir),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
