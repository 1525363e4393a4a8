//! Record types shared by the ingestion library and the server

use serde::{Deserialize, Serialize};

/// A validated, normalized comment ready to be committed.
///
/// `comment_id` is the conflict key. `email` is already lower-cased and
/// `name`/`body` are already stripped of markup tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub post_id: i64,
    pub comment_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// A single rejected data row.
///
/// `row` is 1-indexed over data rows; the header row is not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,
    pub reason: String,
}

impl ValidationError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Outcome of one ingestion run.
///
/// Both sequences keep file order, so `errors[i].row` is strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub valid_records: Vec<NewComment>,
    pub errors: Vec<ValidationError>,
}

impl ParseResult {
    /// Number of data rows seen, valid or not
    pub fn total_rows(&self) -> usize {
        self.valid_records.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_records.is_empty() && self.errors.is_empty()
    }
}
