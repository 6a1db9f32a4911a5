use thiserror::Error;

/// Failures while turning raw input text into a `Dataset`.
///
/// All variants are recoverable at the call site: malformed input will not
/// become valid by re-parsing, so the caller reports and moves on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Syntax(String),

    #[error("unsupported file format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),

    #[error("empty or invalid input: {0}")]
    EmptyOrInvalid(String),
}

/// Failures while deriving a `ChartDataset` from a `Dataset`.
///
/// A missing plotted field is deliberately *not* an error: absent values are
/// passed through so charts degrade to empty bars/points instead of failing.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("dataset contains no records")]
    EmptyDataset,
}
