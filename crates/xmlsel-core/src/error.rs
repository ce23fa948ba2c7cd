//! Error types for building XML trees.

use std::path::PathBuf;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed XML reported by the tokenizer.
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// An end tag did not match the currently open element.
    #[error("Mismatched end tag: expected '</{expected}>', found '</{found}>'")]
    MismatchedEndTag { expected: String, found: String },

    /// An end tag appeared with no element open.
    #[error("Unexpected end tag '</{name}>'")]
    UnexpectedEndTag { name: String },

    /// The input ended while an element was still open.
    #[error("Element '<{name}>' is never closed")]
    UnclosedElement { name: String },

    /// The input contained no element at all.
    #[error("Document has no root element")]
    MissingDocumentElement,

    /// A second top-level element was found.
    #[error("Document has more than one root element (second is '<{name}>')")]
    MultipleDocumentElements { name: String },

    /// Text content appeared outside the document element.
    #[error("Text content is not allowed outside the root element")]
    TextOutsideRoot,

    /// File I/O error.
    #[error("Failed to read document '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a syntax error.
    pub fn syntax(position: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Create a mismatched end tag error.
    pub fn mismatched_end_tag(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MismatchedEndTag {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
