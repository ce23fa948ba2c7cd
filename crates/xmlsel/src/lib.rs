//! CSS selector queries over XML documents.
//!
//! This crate matches CSS selectors against the tree built by `xmlsel-core`:
//!
//! - **Selectors**: Type, universal, class, ID, attribute and pseudo-class
//!   selectors, with descendant, child and sibling combinators
//! - **Relative queries**: `> item`, `+ item` and `:has(+ item)` resolve
//!   against the context node
//! - **Parsing**: Selector text is tokenized with `cssparser`; malformed text
//!   is always an error
//! - **Caching**: Parsed selectors are kept in a shared, bounded cache
//! - **Node sets**: Chainable navigation (`find`, `children`, `next`,
//!   `parent_until`, ...) over query results
//!
//! # Example
//!
//! ```
//! use xmlsel::prelude::*;
//!
//! let doc = Document::parse_str(
//!     "<library><book lang='en'><title>Dune</title></book><book lang='fr'/></library>",
//! )
//! .unwrap();
//!
//! let english = doc.root_set().find("book[lang|=en] > title").unwrap();
//! assert_eq!(english.text().as_deref(), Some("Dune"));
//!
//! let err = doc.root_set().find("book[lang").unwrap_err();
//! assert!(err.parse_error().is_some());
//! ```

pub mod cache;
pub mod engine;
pub mod parser;
pub mod selector;

mod error;
mod node_set;

pub use error::{Error, Result};
pub use node_set::{DocumentExt, NodeSet};
pub use parser::{ParseError, parse};

pub use xmlsel_core::{Document, NodeId};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::cache::{SelectorCache, global_cache};
    pub use crate::selector::{
        AttrOperator, Combinator, CompoundSelector, NthExpr, PseudoClass, SelectorChain,
        SelectorGroup, SimpleSelector,
    };
    pub use crate::{DocumentExt, NodeSet, ParseError};
    pub use xmlsel_core::prelude::*;
}
