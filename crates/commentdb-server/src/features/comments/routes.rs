//! Comment API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/comments/upload` - Upload a CSV file (multipart field `file`)
//! - `GET /api/v1/comments` - List comments with search, sorting and pagination
//! - `DELETE /api/v1/comments` - Delete every stored comment

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use commentdb_ingest::IngestError;
use serde_json::json;
use sqlx::PgPool;

use super::{
    commands::{
        ClearCommentsCommand, ClearCommentsError, UploadCommentsCommand, UploadCommentsError,
    },
    queries::{ListCommentsError, ListCommentsParams, ListCommentsQuery},
};

/// Multipart field carrying the CSV document
const FILE_FIELD: &str = "file";

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the comments router
///
/// `max_upload_bytes` caps the whole upload request body.
pub fn comments_routes(max_upload_bytes: usize) -> Router<PgPool> {
    Router::new()
        .route("/", get(list_comments).delete(clear_comments))
        .route(
            "/upload",
            post(upload_comments).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Upload a CSV file of comments
///
/// # Response
///
/// - `201 Created` - File processed; row errors are listed in `stats.errors`
/// - `400 Bad Request` - No file, not a CSV, or required headers missing
/// - `413 Payload Too Large` - Body over the upload limit
/// - `500 Internal Server Error` - Storage failure, nothing committed
#[tracing::instrument(skip(pool, multipart))]
async fn upload_comments(
    State(pool): State<PgPool>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, CommentApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(UploadCommentsError::NoFile.into());
    };

    let mut command = UploadCommentsCommand::default();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        command.filename = field.file_name().map(str::to_string);
        command.content_type = field.content_type().map(str::to_string);
        command.content = Some(field.bytes().await?.to_vec());
        break;
    }

    let response = super::commands::upload::handle(pool, command).await?;

    tracing::info!(
        total_rows = response.stats.total_rows,
        successful_rows = response.stats.successful_rows,
        "CSV uploaded via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Delete every stored comment
#[tracing::instrument(skip(pool))]
async fn clear_comments(State(pool): State<PgPool>) -> Result<Response, CommentApiError> {
    let response = super::commands::clear::handle(pool, ClearCommentsCommand::default()).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List comments
///
/// `GET /api/v1/comments?page=1&limit=20&search=alice&sortBy=name&order=desc`
///
/// Unparseable parameters fall back to their defaults instead of failing.
#[tracing::instrument(skip(pool, params))]
async fn list_comments(
    State(pool): State<PgPool>,
    params: Option<Query<ListCommentsParams>>,
) -> Result<Response, CommentApiError> {
    let query: ListCommentsQuery = params.map(|Query(p)| p).unwrap_or_default().into();

    let response = super::queries::list::handle(pool, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "Comments listed via API"
    );

    let meta = json!({
        "pagination": response.pagination
    });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
            .into_response(),
    )
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for comment API endpoints
#[derive(Debug)]
enum CommentApiError {
    Multipart(MultipartError),
    UploadError(UploadCommentsError),
    ClearError(ClearCommentsError),
    ListError(ListCommentsError),
}

impl From<MultipartError> for CommentApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<UploadCommentsError> for CommentApiError {
    fn from(err: UploadCommentsError) -> Self {
        Self::UploadError(err)
    }
}

impl From<ClearCommentsError> for CommentApiError {
    fn from(err: ClearCommentsError) -> Self {
        Self::ClearError(err)
    }
}

impl From<ListCommentsError> for CommentApiError {
    fn from(err: ListCommentsError) -> Self {
        Self::ListError(err)
    }
}

impl IntoResponse for CommentApiError {
    fn into_response(self) -> Response {
        match self {
            CommentApiError::Multipart(err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                tracing::warn!(error = %err, "Rejected multipart upload");
                ErrorResponse::new(code, err.body_text()).into_response_with(status)
            },

            // Upload errors
            CommentApiError::UploadError(
                err @ (UploadCommentsError::NoFile | UploadCommentsError::NotCsv),
            ) => ErrorResponse::new("VALIDATION_ERROR", err.to_string())
                .into_response_with(StatusCode::BAD_REQUEST),
            CommentApiError::UploadError(UploadCommentsError::Ingest(
                ref err @ IngestError::MissingHeaders(ref missing),
            )) => ErrorResponse::with_details(
                "VALIDATION_ERROR",
                err.to_string(),
                json!({ "missingHeaders": missing }),
            )
            .into_response_with(StatusCode::BAD_REQUEST),
            CommentApiError::UploadError(UploadCommentsError::Ingest(err)) => {
                tracing::error!(error = %err, "CSV ingestion failed");
                ErrorResponse::new("INTERNAL_ERROR", "Failed to process CSV file")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
            CommentApiError::UploadError(UploadCommentsError::Commit(err)) => {
                tracing::error!(error = %err, "Database error during comment upload");
                ErrorResponse::new(
                    "INTERNAL_ERROR",
                    "Failed to store comments; no rows were committed",
                )
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },

            CommentApiError::ClearError(err) => {
                tracing::error!(error = %err, "Database error while clearing comments");
                ErrorResponse::new("INTERNAL_ERROR", "Failed to delete comments")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },

            CommentApiError::ListError(err) => {
                tracing::error!(error = %err, "Database error while listing comments");
                ErrorResponse::new("INTERNAL_ERROR", "Failed to fetch comments")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}
