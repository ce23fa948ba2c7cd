//! CSS selector types and matching.

mod matcher;
mod types;

pub use matcher::{ChainMatcher, MatchContext, SelectorMatcher, SiblingInfo};
pub use types::*;
