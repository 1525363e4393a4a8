//! HTTP surface: router assembly and the endpoints outside any feature

pub mod response;

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::error::AppError;
use crate::{db, features, middleware};
use response::ApiResponse;

/// Build the full application router
///
/// Layers apply innermost first: compression, request tracing, then CORS.
pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        db: pool.clone(),
        max_upload_bytes: config.upload.max_bytes,
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(pool)
        .nest("/api/v1", features::router(feature_state))
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check(State(pool): State<PgPool>) -> Result<Response, AppError> {
    db::health_check(&pool).await?;

    Ok(ApiResponse::success(json!({
        "status": "healthy",
        "database": "connected"
    }))
    .into_response())
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found: {}", uri.path()))
}
