use std::path::Path;

use crate::data::{Dataset, Value};
use crate::error::ParseError;

/// Input format, decided by file extension before any content is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Derive the format from a file path's extension.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Result<Self, ParseError> {
        if ext.eq_ignore_ascii_case("json") {
            Ok(Format::Json)
        } else if ext.eq_ignore_ascii_case("csv") {
            Ok(Format::Csv)
        } else {
            Err(ParseError::UnsupportedFormat(ext.to_string()))
        }
    }
}

/// Parse raw input text into a Dataset.
///
/// The whole input is materialized up front; there is no streaming mode.
pub fn parse(raw: &str, format: Format) -> Result<Dataset, ParseError> {
    match format {
        Format::Json => parse_json(raw),
        Format::Csv => parse_csv(raw),
    }
}

fn parse_json(raw: &str) -> Result<Dataset, ParseError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ParseError::Syntax(e.to_string()))?;
    Dataset::from_json(&value)
}

/// Naive CSV: split on line breaks and commas, trim every field.
///
/// Quoted fields and escaped commas are not supported (known limitation); a
/// row whose field count differs from the header's is dropped silently rather
/// than reported, so one ragged line does not reject an otherwise usable file.
fn parse_csv(raw: &str) -> Result<Dataset, ParseError> {
    let mut lines = raw.split('\n').filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or_else(|| {
        ParseError::EmptyOrInvalid("CSV input contains no header line".to_string())
    })?;
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        let values: Vec<&str> = line.split(',').collect();
        if values.len() != headers.len() {
            continue;
        }
        rows.push(
            values
                .into_iter()
                .map(|v| Value::Str(v.trim().to_string()))
                .collect(),
        );
    }

    if rows.is_empty() {
        return Err(ParseError::EmptyOrInvalid(
            "CSV input has no data rows matching the header".to_string(),
        ));
    }

    Ok(Dataset::new(headers, rows))
}
