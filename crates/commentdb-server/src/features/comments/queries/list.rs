//! Paginated, searchable listing of stored comments
//!
//! Sort column and direction come from closed enums and are the only parts of
//! the statement built from client input; the search pattern, limit and offset
//! are always bound. The window and the count are two independent reads issued
//! concurrently, so a commit landing in between can make them disagree.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::features::shared::pagination::{parse_lenient, Paginated, PaginationParams};
use crate::models::{Comment, COMMENT_COLUMNS};

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Id,
    PostId,
    Name,
    Email,
    CreatedAt,
}

impl SortField {
    /// Map a client-supplied name; anything unknown sorts by `id`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("postId") => Self::PostId,
            Some("name") => Self::Name,
            Some("email") => Self::Email,
            Some("createdAt") => Self::CreatedAt,
            _ => Self::Id,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::PostId => "post_id",
            Self::Name => "name",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Descending only when asked for `desc`, in any case
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(order) if order.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query-string parameters exactly as received
///
/// Every field stays textual so that junk values fall back to defaults instead
/// of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

impl From<ListCommentsParams> for ListCommentsQuery {
    fn from(params: ListCommentsParams) -> Self {
        Self {
            page: parse_lenient(params.page.as_deref()),
            limit: parse_lenient(params.limit.as_deref()),
            sort_by: SortField::parse(params.sort_by.as_deref()),
            order: SortOrder::parse(params.order.as_deref()),
            search: params.search,
        }
    }
}

pub type ListCommentsResponse = Paginated<Comment>;

#[derive(Debug, thiserror::Error)]
pub enum ListCommentsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListCommentsResponse, ListCommentsError>> for ListCommentsQuery {}

impl crate::cqrs::middleware::Query for ListCommentsQuery {}

impl ListCommentsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }

    /// `ILIKE` pattern for the search term, `None` when there is nothing to match
    ///
    /// LIKE wildcards in the term are escaped so it matches as a plain substring.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }

        let mut pattern = String::with_capacity(term.len() + 2);
        pattern.push('%');
        for c in term.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}

const SEARCHABLE: [&str; 5] = [
    "name",
    "email",
    "body",
    "CAST(post_id AS TEXT)",
    "CAST(comment_id AS TEXT)",
];

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    let Some(pattern) = pattern else {
        return;
    };

    builder.push(" WHERE (");
    for (idx, column) in SEARCHABLE.iter().enumerate() {
        if idx > 0 {
            builder.push(" OR ");
        }
        builder
            .push(*column)
            .push(" ILIKE ")
            .push_bind(pattern.to_string())
            .push(r" ESCAPE '\'");
    }
    builder.push(")");
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListCommentsQuery,
) -> Result<ListCommentsResponse, ListCommentsError> {
    let params = query.pagination();
    let pattern = query.search_pattern();

    let mut window = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM comments", COMMENT_COLUMNS));
    push_filter(&mut window, pattern.as_deref());
    window
        .push(" ORDER BY ")
        .push(query.sort_by.column())
        .push(" ")
        .push(query.order.keyword());
    if query.sort_by != SortField::Id {
        window.push(", id ASC");
    }
    window
        .push(" LIMIT ")
        .push_bind(params.limit())
        .push(" OFFSET ")
        .push_bind(params.offset());

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM comments");
    push_filter(&mut count, pattern.as_deref());

    let (items, total) = tokio::try_join!(
        window.build_query_as::<Comment>().fetch_all(&pool),
        count.build_query_scalar::<i64>().fetch_one(&pool),
    )?;

    tracing::debug!(count = items.len(), total, "Comments listed");

    Ok(Paginated::from_items(items, &params, total))
}
