use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Administrative wipe of every stored comment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearCommentsCommand {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClearCommentsResponse {
    pub deleted_count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClearCommentsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ClearCommentsResponse, ClearCommentsError>> for ClearCommentsCommand {}

impl crate::cqrs::middleware::Command for ClearCommentsCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    _command: ClearCommentsCommand,
) -> Result<ClearCommentsResponse, ClearCommentsError> {
    let result = sqlx::query("DELETE FROM comments").execute(&pool).await?;
    let deleted_count = result.rows_affected();

    tracing::warn!(deleted_count, "All comments deleted");

    Ok(ClearCommentsResponse { deleted_count })
}
