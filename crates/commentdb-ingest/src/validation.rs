//! Per-row validation of raw CSV comments
//!
//! A row is checked against a fixed chain of rules and the first violation is
//! reported. Rules run in this order:
//!
//! 1. Presence of `postId`, `id`, `name`, `email`, `body` (non-empty after trimming)
//! 2. `postId` then `id` are finite numbers
//! 3. `email` looks like `local@domain.tld`
//!
//! On success the row is normalized: `email` is lower-cased and `name`/`body`
//! have markup tags removed.
//!
//! # Examples
//!
//! ```rust
//! use commentdb_ingest::validation::{RawRow, RecordValidator};
//!
//! let validator = RecordValidator::new().unwrap();
//! let row: RawRow = [
//!     ("postId", "1"),
//!     ("id", "7"),
//!     ("name", "<b>Hello</b>"),
//!     ("email", "USER@EXAMPLE.COM"),
//!     ("body", "Body"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let comment = validator.validate(&row, 1).unwrap();
//! assert_eq!(comment.comment_id, 7);
//! assert_eq!(comment.email, "user@example.com");
//! assert_eq!(comment.name, "Hello");
//! ```

use std::collections::HashMap;

use commentdb_common::{NewComment, ValidationError};
use regex::Regex;
use thiserror::Error;

/// Required CSV field names, in the order presence is checked.
///
/// `id` is the per-row identifier of the source file and becomes `comment_id`.
pub const REQUIRED_FIELDS: [&str; 5] = ["postId", "id", "name", "email", "body"];

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const TAG_PATTERN: &str = r"<[^>]*>";

/// The first rule a row broke
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowViolation {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0} must be a valid number")]
    InvalidNumber(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,
}

/// One data row as field name -> raw cell text
#[derive(Debug, Clone, Default)]
pub struct RawRow<'a> {
    fields: HashMap<&'a str, &'a str>,
}

impl<'a> RawRow<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'a str, value: &'a str) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.fields.get(field).copied()
    }

    /// Trimmed value of a field, `None` when absent or blank
    fn present(&self, field: &str) -> Option<&'a str> {
        self.get(field).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RawRow<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Validates and normalizes single rows
///
/// Holds the compiled patterns so one instance can serve a whole file.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    email: Regex,
    tags: Regex,
}

impl RecordValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            tags: Regex::new(TAG_PATTERN)?,
        })
    }

    /// Validate one data row; `row_number` is 1-indexed over data rows
    pub fn validate(&self, row: &RawRow<'_>, row_number: usize) -> Result<NewComment, ValidationError> {
        self.check(row)
            .map_err(|violation| ValidationError::new(row_number, violation.to_string()))
    }

    /// Run the rule chain and return the first violation
    pub fn check(&self, row: &RawRow<'_>) -> Result<NewComment, RowViolation> {
        let mut values = [""; REQUIRED_FIELDS.len()];
        for (slot, field) in values.iter_mut().zip(REQUIRED_FIELDS) {
            *slot = row.present(field).ok_or(RowViolation::MissingField(field))?;
        }
        let [post_id, comment_id, name, email, body] = values;

        let post_id = parse_number(post_id).ok_or(RowViolation::InvalidNumber("postId"))?;
        let comment_id = parse_number(comment_id).ok_or(RowViolation::InvalidNumber("id"))?;

        if !self.email.is_match(email) {
            return Err(RowViolation::InvalidEmail);
        }

        Ok(NewComment {
            post_id,
            comment_id,
            name: self.sanitize(name),
            email: email.to_lowercase(),
            body: self.sanitize(body),
        })
    }

    /// Remove `<...>` tags and surrounding whitespace
    pub fn sanitize(&self, value: &str) -> String {
        self.tags.replace_all(value, "").trim().to_string()
    }

    pub fn is_valid_email(&self, value: &str) -> bool {
        self.email.is_match(value)
    }
}

/// Parse integer or decimal text into a stored integer key.
///
/// Any finite number is accepted. Fractions truncate toward zero and values
/// outside the `i64` range saturate at its bounds.
pub fn parse_number(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }

    let n: f64 = value.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(n.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(fields: &[(&'a str, &'a str)]) -> RawRow<'a> {
        fields.iter().copied().collect()
    }

    fn complete<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("postId", "1"),
            ("id", "1"),
            ("name", "Test"),
            ("email", "test@example.com"),
            ("body", "Body"),
        ]
    }

    fn with<'a>(field: &'a str, value: &'a str) -> RawRow<'a> {
        let mut fields = complete();
        for entry in fields.iter_mut() {
            if entry.0 == field {
                entry.1 = value;
            }
        }
        row(&fields)
    }

    fn validator() -> RecordValidator {
        RecordValidator::new().unwrap()
    }

    #[test]
    fn test_valid_row_is_normalized() {
        let comment = validator().check(&with("email", "USER@EXAMPLE.COM")).unwrap();
        assert_eq!(comment.post_id, 1);
        assert_eq!(comment.comment_id, 1);
        assert_eq!(comment.email, "user@example.com");
    }

    #[test]
    fn test_missing_post_id_reports_field() {
        let err = validator().validate(&with("postId", ""), 1).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.reason, "Missing required field: postId");
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        assert_eq!(
            validator().check(&with("name", "   ")),
            Err(RowViolation::MissingField("name"))
        );
    }

    #[test]
    fn test_absent_field_counts_as_missing() {
        let mut fields = complete();
        fields.retain(|(name, _)| *name != "body");
        assert_eq!(
            validator().check(&row(&fields)),
            Err(RowViolation::MissingField("body"))
        );
    }

    #[test]
    fn test_presence_is_checked_in_field_order() {
        let fields = [("postId", ""), ("id", ""), ("name", ""), ("email", ""), ("body", "")];
        assert_eq!(
            validator().check(&row(&fields)),
            Err(RowViolation::MissingField("postId"))
        );

        let fields = [("postId", "1"), ("id", "1"), ("name", "n"), ("email", ""), ("body", "")];
        assert_eq!(
            validator().check(&row(&fields)),
            Err(RowViolation::MissingField("email"))
        );
    }

    #[test]
    fn test_presence_wins_over_type_and_format() {
        let fields = [("postId", "abc"), ("id", "1"), ("name", ""), ("email", "bad"), ("body", "b")];
        assert_eq!(
            validator().check(&row(&fields)),
            Err(RowViolation::MissingField("name"))
        );
    }

    #[test]
    fn test_non_numeric_post_id() {
        let err = validator().validate(&with("postId", "abc"), 3).unwrap_err();
        assert_eq!(err.reason, "postId must be a valid number");
        assert_eq!(err.row, 3);
    }

    #[test]
    fn test_non_numeric_id_uses_source_field_name() {
        assert_eq!(
            validator().check(&with("id", "abc")),
            Err(RowViolation::InvalidNumber("id"))
        );
    }

    #[test]
    fn test_post_id_checked_before_id() {
        let mut fields = complete();
        fields[0].1 = "x";
        fields[1].1 = "y";
        assert_eq!(
            validator().check(&row(&fields)),
            Err(RowViolation::InvalidNumber("postId"))
        );
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for value in ["NaN", "inf", "-Infinity", "1e400"] {
            assert_eq!(
                validator().check(&with("postId", value)),
                Err(RowViolation::InvalidNumber("postId")),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_parse_number_accepts_decimal_notation() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number(" 7 "), Some(7));
        assert_eq!(parse_number("3.0"), Some(3));
        assert_eq!(parse_number("1e3"), Some(1000));
        assert_eq!(parse_number("-5"), Some(-5));
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn test_parse_number_truncates_fractions() {
        assert_eq!(parse_number("2.5"), Some(2));
        assert_eq!(parse_number("-2.9"), Some(-2));
        assert_eq!(parse_number("0.4"), Some(0));
    }

    #[test]
    fn test_parse_number_saturates_out_of_range() {
        assert_eq!(parse_number("1e20"), Some(i64::MAX));
        assert_eq!(parse_number("-1e20"), Some(i64::MIN));
        assert_eq!(parse_number("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_finite_decimal_ids_pass_the_rule_chain() {
        let mut fields = complete();
        fields[0].1 = "2.5";
        fields[1].1 = "1e20";
        let comment = validator().check(&row(&fields)).unwrap();
        assert_eq!(comment.post_id, 2);
        assert_eq!(comment.comment_id, i64::MAX);
    }

    #[test]
    fn test_email_format() {
        let v = validator();
        assert!(v.is_valid_email("a@b.co"));
        assert!(v.is_valid_email("first.last+tag@sub.example.org"));
        assert!(!v.is_valid_email("notemail.com"));
        assert!(!v.is_valid_email("no@tld"));
        assert!(!v.is_valid_email("two@@example.com"));
        assert!(!v.is_valid_email("sp ace@example.com"));
        assert_eq!(
            v.check(&with("email", "not-email")),
            Err(RowViolation::InvalidEmail)
        );
    }

    #[test]
    fn test_sanitize_strips_tags_and_trims() {
        let v = validator();
        assert_eq!(v.sanitize("  <b>bold</b> text "), "bold text");
        assert_eq!(v.sanitize("<html><script>x</script></html>"), "x");
        assert_eq!(v.sanitize("a < b"), "a < b");
    }

    #[test]
    fn test_markup_only_name_normalizes_to_empty() {
        let comment = validator().check(&with("name", "<br/>")).unwrap();
        assert_eq!(comment.name, "");
    }
}
