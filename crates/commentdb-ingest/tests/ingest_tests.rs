//! Integration tests for CSV ingestion against fixture files

use std::path::PathBuf;

use commentdb_ingest::{CsvIngestor, IngestError, IngestReport};
use proptest::prelude::*;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn ingest_fixture(name: &str) -> Result<commentdb_common::ParseResult, IngestError> {
    let bytes = std::fs::read(fixture_path().join(name)).expect("Failed to read fixture");
    CsvIngestor::new().expect("Failed to build ingestor").ingest(&bytes)
}

#[test]
fn test_valid_fixture_parses_every_row() {
    let result = ingest_fixture("valid-10.csv").expect("Failed to ingest");

    assert_eq!(result.valid_records.len(), 10);
    assert!(result.errors.is_empty());

    let first = &result.valid_records[0];
    assert_eq!(first.post_id, 1);
    assert_eq!(first.comment_id, 1);
    assert_eq!(first.name, "Test Post 1");
    assert_eq!(first.email, "user1@example.com");
    assert_eq!(first.body, "This is a test post body");
}

#[test]
fn test_valid_fixture_keeps_file_order() {
    let result = ingest_fixture("valid-10.csv").expect("Failed to ingest");
    let ids: Vec<i64> = result.valid_records.iter().map(|c| c.comment_id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_special_characters_fixture() {
    let result = ingest_fixture("special-chars.csv").expect("Failed to ingest");

    assert_eq!(result.valid_records.len(), 3);
    assert!(result.errors.is_empty());

    assert_eq!(result.valid_records[0].name, "Name with \"quotes\", and a comma");
    assert!(result.valid_records[1].body.contains("newlines"));
    assert!(result.valid_records[1].body.contains('\n'));
    assert!(!result.valid_records[2].body.contains("<html>"));
    assert_eq!(result.valid_records[2].body, "Visible text");
}

#[test]
fn test_invalid_email_fixture_rejects_every_row() {
    let result = ingest_fixture("invalid-email.csv").expect("Failed to ingest");

    assert!(result.valid_records.is_empty());
    assert_eq!(result.errors.len(), 3);
    for (idx, error) in result.errors.iter().enumerate() {
        assert_eq!(error.row, idx + 1);
        assert!(error.reason.to_lowercase().contains("email"));
    }
}

#[test]
fn test_missing_column_fixture_is_fatal() {
    match ingest_fixture("missing-column.csv") {
        Err(IngestError::MissingHeaders(missing)) => assert_eq!(missing, vec!["email"]),
        other => panic!("expected missing header error, got {:?}", other),
    }
}

#[test]
fn test_header_only_fixture_is_empty() {
    let result = ingest_fixture("empty.csv").expect("Failed to ingest");
    assert!(result.valid_records.is_empty());
    assert!(result.errors.is_empty());
}

#[test]
fn test_report_for_mixed_file() {
    let csv = "postId,id,name,email,body\n\
               1,1,Valid,valid@example.com,Body\n\
               x,2,Invalid,valid@example.com,Body\n\
               3,3,Valid,valid3@example.com,Body\n";
    let result = commentdb_ingest::ingest(csv.as_bytes()).expect("Failed to ingest");
    let report = IngestReport::from_parse(&result);

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.successful_rows, 2);
    assert_eq!(report.failed_rows, 1);
    assert_eq!(report.errors[0].row, 2);
    assert_eq!(report.errors[0].reason, "postId must be a valid number");
}

fn row_strategy() -> impl Strategy<Value = (bool, String)> {
    prop_oneof![
        Just((true, "ok@example.com".to_string())),
        Just((false, "not-an-email".to_string())),
        "[a-z]{1,8}@[a-z]{1,8}\\.[a-z]{2,4}".prop_map(|email| (true, email)),
    ]
}

proptest! {
    #[test]
    fn prop_rows_partition_in_file_order(rows in proptest::collection::vec(row_strategy(), 0..40)) {
        let mut csv = String::from("postId,id,name,email,body\n");
        for (idx, (_, email)) in rows.iter().enumerate() {
            csv.push_str(&format!("1,{},Name {},{},Body\n", idx + 1, idx, email));
        }

        let result = commentdb_ingest::ingest(csv.as_bytes()).unwrap();
        let expected_bad: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, (valid, _))| !valid)
            .map(|(idx, _)| idx + 1)
            .collect();
        let expected_good: Vec<i64> = rows
            .iter()
            .enumerate()
            .filter(|(_, (valid, _))| *valid)
            .map(|(idx, _)| idx as i64 + 1)
            .collect();

        prop_assert_eq!(result.total_rows(), rows.len());
        prop_assert_eq!(result.errors.iter().map(|e| e.row).collect::<Vec<_>>(), expected_bad);
        prop_assert_eq!(
            result.valid_records.iter().map(|c| c.comment_id).collect::<Vec<_>>(),
            expected_good
        );
    }
}
