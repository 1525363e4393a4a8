//! Shared utilities for feature modules
//!
//! - **pagination**: page/limit normalization and response metadata

pub mod pagination;

pub use pagination::{parse_lenient, Paginated, PaginationMetadata, PaginationParams};
