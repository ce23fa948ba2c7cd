//! XML document model for xmlsel.
//!
//! This crate provides the tree that selectors are matched against:
//!
//! - **Document**: An immutable arena of nodes addressed by [`NodeId`]
//! - **Nodes**: Elements, text, comments, processing instructions and CDATA
//! - **Builder**: Parse XML with quick-xml, or build a tree event by event
//! - **Logging**: `tracing` targets and a tree debug renderer
//!
//! # Example
//!
//! ```
//! use xmlsel_core::Document;
//!
//! let doc = Document::parse_str("<list><item id='a'/><item id='b'/></list>").unwrap();
//! let list = doc.document_element().unwrap();
//!
//! let ids: Vec<_> = doc
//!     .element_children(list)
//!     .filter_map(|item| doc.attribute(item, "id"))
//!     .collect();
//! assert_eq!(ids, ["a", "b"]);
//! ```

mod builder;
mod document;
mod error;
pub mod logging;
mod node;

pub use builder::{ParseOptions, TreeBuilder};
pub use document::{Ancestors, Descendants, Document};
pub use error::{Error, Result};
pub use logging::{TreeDebug, TreeFormatOptions, TreeStyle};
pub use node::{Attribute, Element, Node, NodeId, NodeKind, QName};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::{Document, NodeId, NodeKind, ParseOptions, TreeBuilder};
}
