//! commentdb Server Library
//!
//! HTTP service that ingests comment CSV files into PostgreSQL and serves them
//! back as a searchable, paginated listing.
//!
//! # Architecture
//!
//! The server follows a **CQRS** layout:
//!
//! - **Commands** (write operations): commit a validated batch, upload a CSV,
//!   clear every comment. Executed via HTTP POST and DELETE.
//! - **Queries** (read operations): list comments. Executed via HTTP GET.
//!
//! Parsing and row validation live in `commentdb-ingest`; this crate owns the
//! transactional upsert, the listing query, configuration and the HTTP layer.
//!
//! # Example
//!
//! ```no_run
//! use commentdb_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!
//!     let app = api::create_router(pool, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;

// Re-export commonly used types
pub use error::AppError;
