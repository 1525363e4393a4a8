//! commentdb Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and logging setup for the commentdb workspace.
//!
//! # Overview
//!
//! - **Types**: the comment record model, validation errors and parse results
//!   exchanged between the ingestion library and the server
//! - **Logging**: centralized `tracing` subscriber configuration
//!
//! # Example
//!
//! ```no_run
//! use commentdb_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::{NewComment, ParseResult, ValidationError};
