//! Selector parse errors.

use cssparser::{BasicParseErrorKind, ParseErrorKind, ToCss};
use thiserror::Error;

/// Selector parse error with location information.
///
/// Lines and columns are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The selector text (or one comma-separated entry) is empty.
    #[error("empty selector")]
    EmptySelector,

    /// A `[` or `(` without its partner, or a closing bracket of the wrong kind.
    #[error("unbalanced '{bracket}' at column {column}")]
    UnbalancedBracket {
        /// The offending bracket.
        bracket: char,
        /// Column of the offending bracket.
        column: usize,
    },

    /// An attribute selector could not be parsed.
    #[error("malformed attribute selector at {line}:{column}: {message}")]
    MalformedAttribute {
        /// What went wrong.
        message: String,
        /// Line number.
        line: u32,
        /// Column number.
        column: u32,
    },

    /// The argument of a functional pseudo-class could not be parsed.
    #[error("malformed argument to :{name} at {line}:{column}: {message}")]
    MalformedPseudoArgument {
        /// Pseudo-class name.
        name: String,
        /// What went wrong.
        message: String,
        /// Line number.
        line: u32,
        /// Column number.
        column: u32,
    },

    /// The pseudo-class name is not supported.
    #[error("unknown pseudo-class ':{name}' at {line}:{column}")]
    UnknownPseudoClass {
        /// Pseudo-class name as written.
        name: String,
        /// Line number.
        line: u32,
        /// Column number.
        column: u32,
    },

    /// A token that cannot appear at this point.
    #[error("unexpected {token} at {line}:{column}")]
    UnexpectedToken {
        /// The token (quoted) or "end of input".
        token: String,
        /// Line number.
        line: u32,
        /// Column number.
        column: u32,
    },

    /// `:not()` / `:has()` nested too deeply.
    #[error("selector nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// The nesting limit.
        limit: usize,
    },
}

impl ParseError {
    /// Line and column of the error, when known.
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            ParseError::MalformedAttribute { line, column, .. }
            | ParseError::MalformedPseudoArgument { line, column, .. }
            | ParseError::UnknownPseudoClass { line, column, .. }
            | ParseError::UnexpectedToken { line, column, .. } => Some((*line, *column)),
            ParseError::UnbalancedBracket { column, .. } => Some((1, *column as u32)),
            ParseError::EmptySelector | ParseError::NestingTooDeep { .. } => None,
        }
    }
}

/// Custom error kinds raised while walking the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorErrorKind {
    EmptySelector,
    MalformedAttribute(String),
    MalformedPseudoArgument { name: String, message: String },
    UnknownPseudoClass(String),
    NestingTooDeep(usize),
}

pub(crate) type CssError<'i> = cssparser::ParseError<'i, SelectorErrorKind>;

/// Describe a tokenizer-level error.
pub(crate) fn describe_basic(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(token) => format!("'{}'", token.to_css_string()),
        BasicParseErrorKind::EndOfInput => "end of input".to_string(),
        other => format!("{:?}", other),
    }
}

/// Convert a `cssparser` error into the public error type.
pub(crate) fn from_css(error: CssError<'_>) -> ParseError {
    let line = error.location.line + 1;
    let column = error.location.column;
    match error.kind {
        ParseErrorKind::Basic(basic) => ParseError::UnexpectedToken {
            token: describe_basic(&basic),
            line,
            column,
        },
        ParseErrorKind::Custom(SelectorErrorKind::EmptySelector) => ParseError::EmptySelector,
        ParseErrorKind::Custom(SelectorErrorKind::MalformedAttribute(message)) => {
            ParseError::MalformedAttribute {
                message,
                line,
                column,
            }
        }
        ParseErrorKind::Custom(SelectorErrorKind::MalformedPseudoArgument { name, message }) => {
            ParseError::MalformedPseudoArgument {
                name,
                message,
                line,
                column,
            }
        }
        ParseErrorKind::Custom(SelectorErrorKind::UnknownPseudoClass(name)) => {
            ParseError::UnknownPseudoClass { name, line, column }
        }
        ParseErrorKind::Custom(SelectorErrorKind::NestingTooDeep(limit)) => {
            ParseError::NestingTooDeep { limit }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = ParseError::UnknownPseudoClass {
            name: "hover".into(),
            line: 1,
            column: 3,
        };
        assert_eq!(err.to_string(), "unknown pseudo-class ':hover' at 1:3");
        assert_eq!(err.location(), Some((1, 3)));

        let err = ParseError::UnbalancedBracket {
            bracket: '[',
            column: 2,
        };
        assert_eq!(err.to_string(), "unbalanced '[' at column 2");
        assert_eq!(ParseError::EmptySelector.location(), None);
    }
}
