//! Error types for selector queries.

use crate::parser::ParseError;

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Selector parsing error.
    #[error("Invalid selector '{selector}': {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: ParseError,
    },

    /// Document loading error.
    #[error(transparent)]
    Document(#[from] xmlsel_core::Error),
}

impl Error {
    /// Create a selector error.
    pub fn invalid_selector(selector: impl Into<String>, source: ParseError) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            source,
        }
    }

    /// The parse error, if this is a selector error.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::InvalidSelector { source, .. } => Some(source),
            Self::Document(_) => None,
        }
    }
}
