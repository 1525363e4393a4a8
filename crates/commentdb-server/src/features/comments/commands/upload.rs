//! CSV upload workflow
//!
//! Accepts one uploaded file, runs it through the ingestion pipeline and
//! commits the valid rows. Row-level problems are part of a successful
//! response; a missing header or a storage failure fails the whole upload with
//! nothing committed.

use commentdb_ingest::{CsvIngestor, IngestError, IngestReport};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::commit::{self, CommitCommentsCommand, CommitCommentsError};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "CSV processed successfully";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCommentsCommand {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCommentsResponse {
    pub message: String,
    pub stats: IngestReport,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadCommentsError {
    #[error("No file uploaded")]
    NoFile,
    #[error("Only CSV files are allowed")]
    NotCsv,
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Commit(#[from] CommitCommentsError),
}

impl Request<Result<UploadCommentsResponse, UploadCommentsError>> for UploadCommentsCommand {}

impl crate::cqrs::middleware::Command for UploadCommentsCommand {}

impl UploadCommentsCommand {
    pub fn validate(&self) -> Result<(), UploadCommentsError> {
        if self.content.is_none() {
            return Err(UploadCommentsError::NoFile);
        }
        if !self.is_csv() {
            return Err(UploadCommentsError::NotCsv);
        }
        Ok(())
    }

    /// `text/csv` content type (parameters ignored) or a `.csv` file name
    fn is_csv(&self) -> bool {
        let csv_mime = self.content_type.as_deref().is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("text/csv"))
        });
        let csv_name = self
            .filename
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".csv"));
        csv_mime || csv_name
    }
}

#[tracing::instrument(
    skip(pool, command),
    fields(filename = ?command.filename, bytes = command.content.as_ref().map(Vec::len))
)]
pub async fn handle(
    pool: PgPool,
    command: UploadCommentsCommand,
) -> Result<UploadCommentsResponse, UploadCommentsError> {
    command.validate()?;
    let content = command.content.unwrap_or_default();

    let result = CsvIngestor::new()?.ingest(&content)?;

    let commit = commit::handle(
        pool,
        CommitCommentsCommand {
            records: result.valid_records.clone(),
        },
    )
    .await?;

    let stats = IngestReport::new(&result, commit.committed);
    tracing::info!(
        total_rows = stats.total_rows,
        successful_rows = stats.successful_rows,
        failed_rows = stats.failed_rows,
        "CSV upload processed"
    );

    Ok(UploadCommentsResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        stats,
    })
}
