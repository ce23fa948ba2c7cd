//! Logging and debugging facilities.
//!
//! This module provides:
//! - Target names for filtering `tracing` output per subsystem
//! - A debug renderer for document trees
//!
//! # Tracing Integration
//!
//! Both crates log through the `tracing` crate. To see logs, install a
//! subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("xmlsel::engine=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```ignore
//! use xmlsel_core::logging::TreeDebug;
//!
//! let doc = Document::parse_str("<a><b/></a>")?;
//! println!("{}", TreeDebug::new(&doc));
//! ```

use std::fmt::{self, Write as FmtWrite};

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Tree construction.
    pub const BUILDER: &str = "xmlsel_core::builder";
    /// Selector parsing.
    pub const PARSER: &str = "xmlsel::parser";
    /// Compiled selector cache.
    pub const CACHE: &str = "xmlsel::cache";
    /// Selector matching and traversal.
    pub const ENGINE: &str = "xmlsel::engine";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line-per-node representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show each node's document-order position.
    pub show_order: bool,
    /// Whether to show element attributes.
    pub show_attributes: bool,
    /// Whether to show text, CDATA, comment and processing instruction nodes.
    pub show_character_data: bool,
    /// Character data longer than this is cut off.
    pub text_limit: usize,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_order: false,
            show_attributes: true,
            show_character_data: true,
            text_limit: 32,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options showing everything.
    pub fn detailed() -> Self {
        Self {
            show_order: true,
            text_limit: usize::MAX,
            ..Default::default()
        }
    }

    /// Options showing element names only.
    pub fn minimal() -> Self {
        Self {
            show_attributes: false,
            show_character_data: false,
            ..Default::default()
        }
    }
}

/// Renders a document (or a subtree of it) as an indented tree.
#[derive(Debug, Clone)]
pub struct TreeDebug<'a> {
    doc: &'a Document,
    root: NodeId,
    options: TreeFormatOptions,
}

impl<'a> TreeDebug<'a> {
    /// Render the whole document with default options.
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            root: doc.document_node(),
            options: TreeFormatOptions::default(),
        }
    }

    /// Render only the subtree rooted at `root`.
    pub fn subtree(doc: &'a Document, root: NodeId) -> Self {
        Self {
            root,
            ..Self::new(doc)
        }
    }

    /// Replace the format options.
    pub fn with_options(mut self, options: TreeFormatOptions) -> Self {
        self.options = options;
        self
    }

    fn visible(&self, id: NodeId) -> bool {
        self.options.show_character_data
            || matches!(self.doc.kind(id), NodeKind::Element(_) | NodeKind::Document)
    }

    fn write_subtree(
        &self,
        out: &mut impl FmtWrite,
        id: NodeId,
        depth: usize,
        is_last: bool,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        out.write_str(&self.build_prefix(depth, is_last))?;
        self.write_label(out, id)?;
        if self.options.show_order {
            write!(out, " #{}", self.doc.order(id))?;
        }
        out.write_char('\n')?;

        let children: Vec<NodeId> = self
            .doc
            .children(id)
            .iter()
            .copied()
            .filter(|&child| self.visible(child))
            .collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.write_subtree(out, child, depth + 1, i + 1 == count)?;
        }
        Ok(())
    }

    fn write_label(&self, out: &mut impl FmtWrite, id: NodeId) -> fmt::Result {
        match self.doc.kind(id) {
            NodeKind::Document => out.write_str("#document"),
            NodeKind::Element(element) => {
                write!(out, "<{}", element.name)?;
                if self.options.show_attributes {
                    for attr in &element.attributes {
                        write!(out, " {}={:?}", attr.name, attr.value)?;
                    }
                }
                out.write_char('>')
            }
            NodeKind::Text(text) => write!(out, "{:?}", self.clip(text)),
            NodeKind::CData(text) => write!(out, "<![CDATA[{}]]>", self.clip(text)),
            NodeKind::Comment(text) => write!(out, "<!--{}-->", self.clip(text)),
            NodeKind::ProcessingInstruction { target, data } => match data {
                Some(data) => write!(out, "<?{} {}?>", target, self.clip(data)),
                None => write!(out, "<?{}?>", target),
            },
        }
    }

    fn clip<'t>(&self, text: &'t str) -> &'t str {
        match text.char_indices().nth(self.options.text_limit) {
            Some((cut, _)) => &text[..cut],
            None => text,
        }
    }

    /// Build the prefix string for a tree line.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

impl fmt::Display for TreeDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, self.root, 0, true)
    }
}
