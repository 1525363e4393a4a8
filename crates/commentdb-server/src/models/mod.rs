//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored comment as served by the listing endpoint
///
/// `id` is the surrogate key; `comment_id` is the natural key uploads upsert on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub comment_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Column list matching [`Comment`]'s field order
pub const COMMENT_COLUMNS: &str = "id, post_id, comment_id, name, email, body, created_at";
