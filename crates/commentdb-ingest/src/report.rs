//! Summary of an ingestion run, shared by the CLI and the upload endpoint

use std::fmt;

use commentdb_common::{ParseResult, ValidationError};
use serde::{Deserialize, Serialize};

/// Row counts plus per-row errors of one CSV document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub total_rows: usize,
    pub successful_rows: usize,
    pub failed_rows: usize,
    pub errors: Vec<ValidationError>,
}

impl IngestReport {
    /// Build a report; `successful_rows` is the number of rows actually stored
    pub fn new(result: &ParseResult, successful_rows: usize) -> Self {
        Self {
            total_rows: result.total_rows(),
            successful_rows,
            failed_rows: result.errors.len(),
            errors: result.errors.clone(),
        }
    }

    /// Report for a dry run, where every valid row counts as successful
    pub fn from_parse(result: &ParseResult) -> Self {
        Self::new(result, result.valid_records.len())
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total rows:      {}", self.total_rows)?;
        writeln!(f, "Successful rows: {}", self.successful_rows)?;
        write!(f, "Failed rows:     {}", self.failed_rows)?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commentdb_common::NewComment;

    fn sample() -> ParseResult {
        ParseResult {
            valid_records: vec![NewComment {
                post_id: 1,
                comment_id: 1,
                name: "n".into(),
                email: "a@b.co".into(),
                body: "b".into(),
            }],
            errors: vec![ValidationError::new(2, "Invalid email format")],
        }
    }

    #[test]
    fn test_counts() {
        let report = IngestReport::from_parse(&sample());
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.successful_rows, 1);
        assert_eq!(report.failed_rows, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_display_lists_errors() {
        let text = IngestReport::from_parse(&sample()).to_string();
        assert!(text.contains("Total rows:      2"));
        assert!(text.contains("row 2: Invalid email format"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(IngestReport::from_parse(&sample())).unwrap();
        assert_eq!(json["totalRows"], 2);
        assert_eq!(json["successfulRows"], 1);
        assert_eq!(json["failedRows"], 1);
        assert_eq!(json["errors"][0]["row"], 2);
        assert_eq!(json["errors"][0]["reason"], "Invalid email format");
    }
}
