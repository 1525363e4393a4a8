//! commentdb Ingest Library
//!
//! Turns uploaded CSV documents into validated comment records.
//!
//! # Overview
//!
//! - **Parser**: header check and row iteration over an in-memory buffer
//! - **Validation**: the per-row rule chain and normalization
//! - **Report**: row counts and errors for display or serialization
//!
//! Nothing here touches the database; committing the valid records is the
//! server's job.
//!
//! # Example
//!
//! ```
//! use commentdb_ingest::ingest;
//!
//! let csv = "postId,id,name,email,body\n1,1,Ann,ANN@EXAMPLE.COM,Hi\n1,2,Bob,nope,Hi\n";
//! let result = ingest(csv.as_bytes())?;
//!
//! assert_eq!(result.valid_records.len(), 1);
//! assert_eq!(result.errors[0].row, 2);
//! # Ok::<(), commentdb_ingest::IngestError>(())
//! ```

pub mod parser;
pub mod report;
pub mod validation;

pub use parser::{has_required_headers, ingest, CsvIngestor, IngestError};
pub use report::IngestReport;
pub use validation::{RecordValidator, RowViolation, REQUIRED_FIELDS};
