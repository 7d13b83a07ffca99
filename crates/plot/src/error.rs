//! Error types for the plot crate

use thiserror::Error;

/// Maximum length of the source excerpt carried by a parse error
const FRAGMENT_LEN: usize = 40;

/// Errors that can occur when working with charts
#[derive(Error, Debug)]
pub enum PlotError {
    /// Malformed chart description
    #[error("Parse error: {message} near `{fragment}`")]
    Parse { message: String, fragment: String },

    /// A whole series could not produce any valid point
    #[error("Series {index} skipped: {reason}")]
    Series { index: usize, reason: String },

    /// Delimited table could not be read
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    /// A table column selector matched nothing
    #[error("Unknown table column: {0}")]
    Column(String),

    /// Expression compilation failure
    #[error("Expression error in `{source_text}`: {error}")]
    Expression {
        source_text: String,
        error: expr::ExprError,
    },

    /// Export serialization error
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotError {
    /// Build a parse error carrying an excerpt of the input at `offset`
    pub fn parse(message: impl Into<String>, input: &str, offset: usize) -> Self {
        PlotError::Parse {
            message: message.into(),
            fragment: fragment_at(input, offset),
        }
    }

    /// Build a series error
    pub fn series(index: usize, reason: impl Into<String>) -> Self {
        PlotError::Series {
            index,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PlotError {
    fn from(err: serde_json::Error) -> Self {
        PlotError::Export(err.to_string())
    }
}

/// Excerpt of `input` starting at the byte `offset`
fn fragment_at(input: &str, offset: usize) -> String {
    let mut start = offset.min(input.len());
    while !input.is_char_boundary(start) {
        start -= 1;
    }
    let fragment: String = input[start..].chars().take(FRAGMENT_LEN).collect();
    let fragment = fragment.trim();
    if fragment.is_empty() {
        "<end of input>".to_string()
    } else {
        fragment.to_string()
    }
}

/// Result type for chart operations
pub type PlotResult<T> = Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_fragment() {
        let err = PlotError::parse("unterminated brace", "plot{sin(x) end-axis", 4);
        assert_eq!(
            err.to_string(),
            "Parse error: unterminated brace near `{sin(x) end-axis`"
        );
    }

    #[test]
    fn test_parse_error_at_end() {
        let err = PlotError::parse("missing end-axis", "begin-axis", 10);
        assert!(err.to_string().contains("<end of input>"));
    }

    #[test]
    fn test_fragment_is_truncated() {
        let long = "x".repeat(200);
        if let PlotError::Parse { fragment, .. } = PlotError::parse("bad", &long, 0) {
            assert_eq!(fragment.len(), FRAGMENT_LEN);
        } else {
            panic!("Expected Parse");
        }
    }

    #[test]
    fn test_series_error_display() {
        let err = PlotError::series(2, "no valid points");
        assert_eq!(err.to_string(), "Series 2 skipped: no valid points");
    }
}
