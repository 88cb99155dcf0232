//! Loading review records from CSV and JSON files.
//!
//! Both formats are validated up front: if any of the configured text, rating
//! or product-id columns is absent the whole file is rejected with
//! [`ReviewRagError::MissingFields`]. Rows are never silently dropped here;
//! filtering happens later in [`ReviewPreprocessor`](crate::ReviewPreprocessor).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::ColumnMapping;
use crate::document::ReviewRecord;
use crate::error::{ReviewRagError, Result};

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of objects.
    Json,
}

impl InputFormat {
    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension =
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ReviewRagError::UnsupportedFormat(format!(".{extension}"))),
        }
    }
}

/// Reads review files from a data directory.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::ReviewLoader;
///
/// let loader = ReviewLoader::new("data");
/// let records = loader.load("sample_reviews.json")?;
/// ```
#[derive(Debug, Clone)]
pub struct ReviewLoader {
    data_dir: PathBuf,
    columns: ColumnMapping,
}

impl ReviewLoader {
    /// Create a loader rooted at `data_dir` using the default column names.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), columns: ColumnMapping::default() }
    }

    /// Use custom column names.
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// The directory files are resolved against.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load `filename` (relative to the data directory), dispatching on its extension.
    ///
    /// # Errors
    ///
    /// [`ReviewRagError::UnsupportedFormat`] for extensions other than `.csv`/`.json`,
    /// [`ReviewRagError::MissingFields`] when required columns are absent.
    pub fn load(&self, filename: &str) -> Result<Vec<ReviewRecord>> {
        match InputFormat::from_path(Path::new(filename))? {
            InputFormat::Csv => self.load_csv(filename),
            InputFormat::Json => self.load_json(filename),
        }
    }

    /// Load a CSV file from the data directory.
    pub fn load_csv(&self, filename: &str) -> Result<Vec<ReviewRecord>> {
        let bytes = std::fs::read(self.data_dir.join(filename))?;
        let records = self.parse_csv(&bytes)?;
        info!(file = filename, rows = records.len(), "loaded CSV reviews");
        Ok(records)
    }

    /// Load a JSON file from the data directory.
    pub fn load_json(&self, filename: &str) -> Result<Vec<ReviewRecord>> {
        let bytes = std::fs::read(self.data_dir.join(filename))?;
        let records = self.parse_json(&bytes)?;
        info!(file = filename, rows = records.len(), "loaded JSON reviews");
        Ok(records)
    }

    /// Parse in-memory file content, using `filename` only to pick the format.
    pub fn load_bytes(&self, filename: &str, bytes: &[u8]) -> Result<Vec<ReviewRecord>> {
        let records = match InputFormat::from_path(Path::new(filename))? {
            InputFormat::Csv => self.parse_csv(bytes)?,
            InputFormat::Json => self.parse_json(bytes)?,
        };
        info!(file = filename, rows = records.len(), "loaded uploaded reviews");
        Ok(records)
    }

    /// Names of the `.csv` and `.json` files in the data directory, sorted.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.is_file() && InputFormat::from_path(&path).is_ok() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn validate<'a>(&self, present: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let present: BTreeSet<&str> = present.into_iter().collect();
        let missing: Vec<String> = self
            .columns
            .required()
            .into_iter()
            .filter(|column| !present.contains(column))
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            debug!(?missing, "input rejected");
            Err(ReviewRagError::MissingFields { fields: missing })
        }
    }

    fn parse_csv(&self, bytes: &[u8]) -> Result<Vec<ReviewRecord>> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers().map_err(csv_error)?.clone();
        self.validate(headers.iter())?;

        let position = |name: &str| headers.iter().position(|h| h == name);
        let text_idx = position(&self.columns.text);
        let rating_idx = position(&self.columns.rating);
        let product_idx = position(&self.columns.product_id);
        let summary_idx = position(&self.columns.summary);

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(csv_error)?;
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i)).map(str::trim).filter(|s| !s.is_empty())
            };
            let rating = match cell(rating_idx) {
                Some(raw) => Some(parse_rating(raw, row, &self.columns.rating, "CSV")?),
                None => None,
            };
            records.push(ReviewRecord {
                text: cell(text_idx).map(str::to_string),
                rating,
                product_id: cell(product_idx).unwrap_or_default().to_string(),
                summary: cell(summary_idx).map(str::to_string),
            });
        }
        Ok(records)
    }

    fn parse_json(&self, bytes: &[u8]) -> Result<Vec<ReviewRecord>> {
        let rows: Vec<Map<String, Value>> =
            serde_json::from_slice(bytes).map_err(|e| ReviewRagError::ParseError {
                format: "JSON",
                message: format!("expected an array of review objects: {e}"),
            })?;

        let columns: BTreeSet<&str> =
            rows.iter().flat_map(|row| row.keys().map(String::as_str)).collect();
        self.validate(columns)?;

        rows.iter()
            .enumerate()
            .map(|(row, object)| {
                let rating = match object.get(&self.columns.rating) {
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(Value::String(s)) if !s.trim().is_empty() => {
                        Some(parse_rating(s.trim(), row, &self.columns.rating, "JSON")?)
                    }
                    Some(Value::Null) | Some(Value::String(_)) | None => None,
                    Some(other) => {
                        return Err(ReviewRagError::ParseError {
                            format: "JSON",
                            message: format!(
                                "row {row}: '{}' is not numeric: {other}",
                                self.columns.rating
                            ),
                        });
                    }
                };
                Ok(ReviewRecord {
                    text: json_text(object.get(&self.columns.text)),
                    rating,
                    product_id: json_text(object.get(&self.columns.product_id)).unwrap_or_default(),
                    summary: json_text(object.get(&self.columns.summary)),
                })
            })
            .collect()
    }
}

fn csv_error(e: csv::Error) -> ReviewRagError {
    ReviewRagError::ParseError { format: "CSV", message: e.to_string() }
}

fn parse_rating(raw: &str, row: usize, column: &str, format: &'static str) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| ReviewRagError::ParseError {
        format,
        message: format!("row {row}: '{column}' is not numeric: '{raw}'"),
    })
}

/// Render a JSON cell as text; null and empty strings become `None`.
fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> ReviewLoader {
        ReviewLoader::new(".")
    }

    #[test]
    fn json_rows_become_records() {
        let json = br#"[
            {"reviewText": "Great for beginners, very intuitive.", "rating": 5, "asin": "B001", "summary": "Love it"},
            {"reviewText": null, "rating": "2", "asin": 1234}
        ]"#;
        let records = loader().load_bytes("upload.json", json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary.as_deref(), Some("Love it"));
        assert_eq!(records[0].rating, Some(5.0));
        assert_eq!(records[1].text, None);
        assert_eq!(records[1].rating, Some(2.0));
        assert_eq!(records[1].product_id, "1234");
    }

    #[test]
    fn csv_rows_become_records() {
        let csv = b"asin,reviewText,rating,summary\nB001,Works fine,4,\nB002,,,Meh\n";
        let records = loader().load_bytes("upload.CSV", csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text.as_deref(), Some("Works fine"));
        assert_eq!(records[0].summary, None);
        assert_eq!(records[1].text, None);
        assert_eq!(records[1].rating, None);
    }

    #[test]
    fn missing_columns_are_named() {
        let csv = b"reviewText,stars\nhello,5\n";
        let err = loader().load_bytes("x.csv", csv).unwrap_err();
        match err {
            ReviewRagError::MissingFields { fields } => assert_eq!(fields, vec!["rating", "asin"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = loader().load("file.txt").unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn non_numeric_rating_is_a_parse_error() {
        let json = br#"[{"reviewText": "x", "rating": "five", "asin": "B001"}]"#;
        let err = loader().load_bytes("x.json", json).unwrap_err();
        assert!(matches!(err, ReviewRagError::ParseError { format: "JSON", .. }));
    }
}
