use crate::parse_util::ParseError;
use thiserror::Error;

/// Failures surfaced by the bundle serializers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BundleError {
    /// Aggregate of every structural or tokenization error found in one pass.
    #[error("{0}")]
    Parse(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Could not overwrite an XTB translation")]
    OverwriteResolved { id: String },

    #[error("Invalid bundle config: {0}")]
    Config(String),
}

impl BundleError {
    /// Join `errors` under a `<format> parse errors:` header.
    pub fn from_parse_errors(format: &str, errors: &[ParseError]) -> Self {
        let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        BundleError::Parse(format!("{} parse errors:\n{}", format, lines.join("\n")))
    }
}

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::Config(err.to_string())
    }
}
