//! Feature modules implementing the commentdb API
//!
//! Each feature is a vertical slice following the CQRS pattern:
//! - `commands/` - Write operations (commit, upload, clear)
//! - `queries/` - Read operations (list)
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries implement `mediator::Request`, and their handlers are
//! plain async functions taking the pool.

pub mod comments;
pub mod shared;

use axum::Router;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// Ceiling for a CSV upload request body
    pub max_upload_bytes: usize,
}

/// Creates the API router with all feature routes mounted
///
/// - `/comments` - Upload, listing and bulk delete
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest(
        "/comments",
        comments::comments_routes(state.max_upload_bytes).with_state(state.db.clone()),
    )
}
