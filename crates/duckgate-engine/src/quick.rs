//! Quick-view SQL construction.
//!
//! A quick view is a bounded `SELECT *` over a single file URI, read with
//! the DuckDB table function that matches the file format:
//!
//! ```sql
//! SELECT * FROM read_csv_auto('s3://bucket/file.csv') LIMIT 100
//! ```
//!
//! DuckDB table functions take the URI as a string literal, so the URI is
//! spliced in after [`escape_literal`]. The reader name never comes from
//! input: it is picked from the closed [`FileFormat`] set.

use crate::session::escape_literal;
use std::fmt;

/// Row limit used when the caller gives none (or a non-positive one).
pub const DEFAULT_QUICK_LIMIT: i64 = 100;

/// File formats a quick view can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileFormat {
    /// Apache Parquet, also the fallback for unknown formats.
    #[default]
    Parquet,
    /// JSON, JSON Lines or NDJSON.
    Json,
    /// Delimited text with sniffed dialect.
    Csv,
}

impl FileFormat {
    /// Map a caller-supplied format name to a format.
    ///
    /// Matching ignores case and surrounding whitespace. Unknown or empty
    /// names fall back to Parquet rather than failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use duckgate_engine::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_name(" NDJSON "), FileFormat::Json);
    /// assert_eq!(FileFormat::from_name("avro"), FileFormat::Parquet);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" | "jsonl" | "ndjson" => FileFormat::Json,
            "csv" => FileFormat::Csv,
            _ => FileFormat::Parquet,
        }
    }

    /// The DuckDB table function reading this format.
    pub fn reader(self) -> &'static str {
        match self {
            FileFormat::Parquet => "read_parquet",
            FileFormat::Json => "read_json_auto",
            FileFormat::Csv => "read_csv_auto",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Parquet => "parquet",
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

/// A normalised quick-view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickView {
    /// File URI, unescaped.
    pub uri: String,
    /// Reader selection.
    pub format: FileFormat,
    /// Positive row limit. There is no upper bound.
    pub limit: i64,
}

impl QuickView {
    /// Normalise raw request fields.
    ///
    /// `limit` values of zero or below become [`DEFAULT_QUICK_LIMIT`].
    pub fn new(uri: impl Into<String>, format: &str, limit: i64) -> Self {
        Self {
            uri: uri.into(),
            format: FileFormat::from_name(format),
            limit: if limit <= 0 { DEFAULT_QUICK_LIMIT } else { limit },
        }
    }

    /// Render the `SELECT` statement.
    pub fn to_sql(&self) -> String {
        format!(
            "SELECT * FROM {}('{}') LIMIT {}",
            self.format.reader(),
            escape_literal(&self.uri),
            self.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mapping() {
        assert_eq!(FileFormat::from_name("parquet"), FileFormat::Parquet);
        assert_eq!(FileFormat::from_name("json"), FileFormat::Json);
        assert_eq!(FileFormat::from_name("jsonl"), FileFormat::Json);
        assert_eq!(FileFormat::from_name("ndjson"), FileFormat::Json);
        assert_eq!(FileFormat::from_name("CSV"), FileFormat::Csv);
        assert_eq!(FileFormat::from_name(""), FileFormat::Parquet);
        assert_eq!(FileFormat::from_name("xlsx"), FileFormat::Parquet);
    }

    #[test]
    fn test_csv_quick_view_default_limit() {
        let view = QuickView::new("s3://bucket/file.csv", "csv", 0);
        assert_eq!(
            view.to_sql(),
            "SELECT * FROM read_csv_auto('s3://bucket/file.csv') LIMIT 100"
        );
    }

    #[test]
    fn test_negative_limit_uses_default() {
        assert_eq!(QuickView::new("f.parquet", "", -5).limit, DEFAULT_QUICK_LIMIT);
        assert_eq!(QuickView::new("f.parquet", "", 5000).limit, 5000);
    }

    #[test]
    fn test_uri_quote_is_escaped() {
        let sql = QuickView::new("s3://bucket/a'b.json", "json", 10).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM read_json_auto('s3://bucket/a''b.json') LIMIT 10"
        );
    }

    #[test]
    fn test_injection_attempt_stays_inside_literal() {
        let sql = QuickView::new("x'); DROP TABLE t; --", "parquet", 1).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM read_parquet('x''); DROP TABLE t; --') LIMIT 1"
        );
    }
}
