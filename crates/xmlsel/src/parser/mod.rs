//! Selector parsing module.

mod error;
mod selector_parser;

use std::str::FromStr;

pub use error::ParseError;
pub use selector_parser::MAX_NESTING_DEPTH;

use crate::selector::SelectorGroup;

/// Parse selector text into a [`SelectorGroup`].
///
/// Invalid text is always an error; it never turns into a selector that
/// silently matches nothing.
///
/// # Example
///
/// ```
/// let group = xmlsel::parser::parse("list > item:first-child, #main").unwrap();
/// assert_eq!(group.chains.len(), 2);
/// assert!(xmlsel::parser::parse("item[").is_err());
/// ```
pub fn parse(text: &str) -> Result<SelectorGroup, ParseError> {
    selector_parser::parse_selector_group(text)
}

impl FromStr for SelectorGroup {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
