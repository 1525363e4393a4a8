//! CSV ingestion: header check plus per-row validation
//!
//! The whole buffer is parsed in memory. The header row decides which column
//! feeds which field; header names are trimmed and matched case-sensitively,
//! and extra columns are ignored. A header missing any required name aborts the
//! run before a single data row is looked at. Everything after that is
//! row-level: a short row, an undecodable cell or a rule violation produces one
//! [`ValidationError`] and the run moves on.

use std::borrow::Cow;
use std::collections::HashMap;

use commentdb_common::{ParseResult, ValidationError};
use csv::{ByteRecord, ReaderBuilder};
use thiserror::Error;
use tracing::{debug, info};

use crate::validation::{RawRow, RecordValidator, REQUIRED_FIELDS};

/// Fatal ingestion failures. Row problems are never reported here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid validation pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Column position of each required field
#[derive(Debug, Clone)]
struct HeaderMap {
    columns: Vec<(&'static str, usize)>,
}

impl HeaderMap {
    /// Resolve required fields against a header row.
    ///
    /// When a name appears twice the first column wins.
    fn resolve(header: &ByteRecord) -> Result<Self, IngestError> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, raw) in header.iter().enumerate() {
            let name = String::from_utf8_lossy(raw);
            let name = name.trim().trim_start_matches('\u{feff}').trim();
            positions.entry(name.to_string()).or_insert(idx);
        }

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !positions.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MissingHeaders(missing));
        }

        let columns = REQUIRED_FIELDS
            .iter()
            .filter_map(|field| positions.get(*field).map(|idx| (*field, *idx)))
            .collect();
        Ok(Self { columns })
    }

    /// Decode the required cells of one record.
    ///
    /// Cells past the end of a short row are simply absent. Undecodable bytes
    /// are replaced so the rule chain still sees every cell; the first field
    /// that needed replacing is returned alongside.
    fn decode<'r>(
        &self,
        record: &'r ByteRecord,
    ) -> (Vec<(&'static str, Cow<'r, str>)>, Option<&'static str>) {
        let mut malformed = None;
        let cells = self
            .columns
            .iter()
            .filter_map(|(field, idx)| {
                let bytes = record.get(*idx)?;
                let value = String::from_utf8_lossy(bytes);
                if matches!(value, Cow::Owned(_)) && malformed.is_none() {
                    malformed = Some(*field);
                }
                Some((*field, value))
            })
            .collect();
        (cells, malformed)
    }
}

/// Turns a raw CSV buffer into a [`ParseResult`]
#[derive(Debug, Clone)]
pub struct CsvIngestor {
    validator: RecordValidator,
}

impl CsvIngestor {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            validator: RecordValidator::new()?,
        })
    }

    /// Parse and validate a complete CSV document
    ///
    /// # Errors
    ///
    /// Only [`IngestError::MissingHeaders`] is expected in practice; the other
    /// variants cover reader failures that an in-memory buffer does not produce.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn ingest(&self, bytes: &[u8]) -> Result<ParseResult, IngestError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let header = reader.byte_headers()?.clone();
        let headers = HeaderMap::resolve(&header)?;

        let mut result = ParseResult::default();
        let mut record = ByteRecord::new();
        let mut row_number = 0usize;

        loop {
            match reader.read_byte_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    row_number += 1;
                    let (cells, malformed) = headers.decode(&record);
                    let row: RawRow = cells
                        .iter()
                        .map(|(field, value)| (*field, value.as_ref()))
                        .collect();
                    match (self.validator.validate(&row, row_number), malformed) {
                        (Ok(comment), None) => result.valid_records.push(comment),
                        (Ok(_), Some(field)) => {
                            debug!(row = row_number, field, "Row contains invalid UTF-8");
                            result.errors.push(ValidationError::new(
                                row_number,
                                format!("Malformed row: {} is not valid UTF-8", field),
                            ));
                        },
                        (Err(err), _) => {
                            debug!(row = err.row, reason = %err.reason, "Row rejected");
                            result.errors.push(err);
                        },
                    }
                },
                Err(e) if e.is_io_error() => return Err(IngestError::Csv(e)),
                Err(e) => {
                    row_number += 1;
                    result
                        .errors
                        .push(ValidationError::new(row_number, format!("Malformed row: {}", e)));
                },
            }
        }

        info!(
            total_rows = result.total_rows(),
            valid_rows = result.valid_records.len(),
            failed_rows = result.errors.len(),
            "CSV ingestion finished"
        );

        Ok(result)
    }
}

/// Convenience wrapper around [`CsvIngestor::ingest`]
pub fn ingest(bytes: &[u8]) -> Result<ParseResult, IngestError> {
    CsvIngestor::new()?.ingest(bytes)
}

/// Whether a header row carries every required field name
pub fn has_required_headers<S: AsRef<str>>(headers: &[S]) -> bool {
    REQUIRED_FIELDS
        .iter()
        .all(|field| headers.iter().any(|h| h.as_ref().trim() == *field))
}
