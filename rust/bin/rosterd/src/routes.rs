//! Route registration — groups module routes + system endpoints.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Build the complete router.
pub fn build_router(groups: Router) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .merge(groups)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "rosterd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
