//! Chainable query results.

use std::collections::HashSet;
use std::fmt;

use xmlsel_core::{Document, NodeId};

use crate::cache::global_cache;
use crate::engine;
use crate::error::Result;
use crate::selector::SelectorGroup;

/// An ordered set of nodes from one document.
///
/// A `NodeSet` is a view: it holds ids into a borrowed [`Document`] and never
/// owns nodes. Every operation returns a fresh set, so calls chain:
///
/// ```
/// use xmlsel::prelude::*;
///
/// let doc = Document::parse_str("<m><a><b/><c/></a><a><c/></a></m>").unwrap();
/// let set = doc.root_set().find("a").unwrap().first_child().next();
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.name(), Some("c"));
/// ```
///
/// Sets built by selector matching or by child and sibling steps are in
/// document order. `parent` and the `*_until` walks keep the order in which
/// nodes were reached (nearest first for each source node). Sets never hold
/// duplicates.
#[derive(Clone)]
pub struct NodeSet<'doc> {
    doc: &'doc Document,
    nodes: Vec<NodeId>,
}

impl<'doc> NodeSet<'doc> {
    /// Create a set from arbitrary nodes, sorted into document order.
    pub fn new(doc: &'doc Document, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut nodes: Vec<NodeId> = nodes.into_iter().collect();
        doc.sort_in_document_order(&mut nodes);
        Self { doc, nodes }
    }

    /// Create a set keeping the order nodes are reached in, dropping repeats.
    fn in_visit_order(doc: &'doc Document, visited: impl IntoIterator<Item = NodeId>) -> Self {
        let mut seen = HashSet::new();
        let nodes = visited.into_iter().filter(|&id| seen.insert(id)).collect();
        Self { doc, nodes }
    }

    /// An empty set over `doc`.
    pub fn empty(doc: &'doc Document) -> Self {
        Self {
            doc,
            nodes: Vec::new(),
        }
    }

    /// The document the nodes belong to.
    pub fn document(&self) -> &'doc Document {
        self.doc
    }

    // =========================================================================
    // Selector queries
    // =========================================================================

    /// Find elements matching `selector`, using every node of this set as context.
    ///
    /// Selector text is parsed once and cached process-wide.
    pub fn find(&self, selector: &str) -> Result<NodeSet<'doc>> {
        let group = global_cache().get_or_parse(selector)?;
        Ok(self.select(&group))
    }

    /// Like [`find`](Self::find) with an already parsed selector.
    pub fn select(&self, group: &SelectorGroup) -> NodeSet<'doc> {
        Self {
            doc: self.doc,
            nodes: engine::find(self.doc, group, &self.nodes),
        }
    }

    /// Keep only the nodes matching `selector` themselves.
    pub fn filter(&self, selector: &str) -> Result<NodeSet<'doc>> {
        let group = global_cache().get_or_parse(selector)?;
        let nodes = self
            .nodes
            .iter()
            .copied()
            .filter(|&id| engine::matches(self.doc, &group, id))
            .collect();
        Ok(Self {
            doc: self.doc,
            nodes,
        })
    }

    /// Check whether any node matches `selector`.
    pub fn is(&self, selector: &str) -> Result<bool> {
        let group = global_cache().get_or_parse(selector)?;
        Ok(self
            .nodes
            .iter()
            .any(|&id| engine::matches(self.doc, &group, id)))
    }

    // =========================================================================
    // Tree navigation
    // =========================================================================

    /// Element children of every node.
    pub fn children(&self) -> NodeSet<'doc> {
        let doc = self.doc;
        Self::new(doc, self.nodes.iter().flat_map(|&id| doc.element_children(id)))
    }

    /// The first element child of every node.
    pub fn first_child(&self) -> NodeSet<'doc> {
        let doc = self.doc;
        Self::new(doc, self.nodes.iter().filter_map(|&id| doc.first_element_child(id)))
    }

    /// The last element child of every node.
    pub fn last_child(&self) -> NodeSet<'doc> {
        let doc = self.doc;
        Self::new(doc, self.nodes.iter().filter_map(|&id| doc.last_element_child(id)))
    }

    /// The first node of the set.
    pub fn first(&self) -> NodeSet<'doc> {
        Self::new(self.doc, self.nodes.first().copied())
    }

    /// The last node of the set.
    pub fn last(&self) -> NodeSet<'doc> {
        Self::new(self.doc, self.nodes.last().copied())
    }

    /// The nearest following element sibling of every node.
    pub fn next(&self) -> NodeSet<'doc> {
        let doc = self.doc;
        Self::new(doc, self.nodes.iter().filter_map(|&id| doc.next_element_sibling(id)))
    }

    /// The nearest preceding element sibling of every node.
    pub fn prev(&self) -> NodeSet<'doc> {
        let doc = self.doc;
        Self::new(doc, self.nodes.iter().filter_map(|&id| doc.prev_element_sibling(id)))
    }

    /// The element parent of every node.
    ///
    /// The document element has no element parent and stays in the set.
    /// Parents keep the order of the nodes they were reached from.
    pub fn parent(&self) -> NodeSet<'doc> {
        let doc = self.doc;
        Self::in_visit_order(
            doc,
            self.nodes.iter().map(|&id| {
                doc.parent(id)
                    .filter(|&parent| doc.is_element(parent))
                    .unwrap_or(id)
            }),
        )
    }

    /// Ancestors of every node, nearest first, up to but excluding the first
    /// one that matches `stop`.
    ///
    /// When nothing matches, the walk ends with the document node.
    pub fn parent_until(&self, stop: &str) -> Result<NodeSet<'doc>> {
        let group = global_cache().get_or_parse(stop)?;
        let doc = self.doc;
        Ok(Self::in_visit_order(
            doc,
            self.nodes.iter().flat_map(|&id| {
                doc.ancestors(id)
                    .take_while(|&ancestor| !engine::matches(doc, &group, ancestor))
            }),
        ))
    }

    /// Following element siblings of every node, nearest first, up to but
    /// excluding the first one that matches `stop`.
    pub fn next_until(&self, stop: &str) -> Result<NodeSet<'doc>> {
        let group = global_cache().get_or_parse(stop)?;
        let doc = self.doc;
        Ok(Self::in_visit_order(
            doc,
            self.nodes.iter().flat_map(|&id| {
                doc.following_element_siblings(id)
                    .take_while(|&sibling| !engine::matches(doc, &group, sibling))
            }),
        ))
    }

    /// Preceding element siblings of every node, nearest first, up to but
    /// excluding the first one that matches `stop`.
    pub fn prev_until(&self, stop: &str) -> Result<NodeSet<'doc>> {
        let group = global_cache().get_or_parse(stop)?;
        let doc = self.doc;
        Ok(Self::in_visit_order(
            doc,
            self.nodes.iter().flat_map(|&id| {
                doc.preceding_element_siblings(id)
                    .take_while(|&sibling| !engine::matches(doc, &group, sibling))
            }),
        ))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the node ids.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    /// The node ids in set order.
    pub fn ids(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The node at `index`.
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    /// Qualified name of the first node.
    pub fn name(&self) -> Option<&'doc str> {
        self.nodes.first().and_then(|&id| self.doc.element_name(id))
    }

    /// Attribute value of the first node.
    pub fn attr(&self, name: &str) -> Option<&'doc str> {
        self.nodes.first().and_then(|&id| self.doc.attribute(id, name))
    }

    /// Text content of the first node.
    pub fn text(&self) -> Option<String> {
        self.nodes.first().map(|&id| self.doc.text_content(id))
    }

    /// Check whether any node carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.nodes
            .iter()
            .any(|&id| self.doc.element(id).is_some_and(|e| e.has_class(class)))
    }
}

impl PartialEq for NodeSet<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.nodes == other.nodes
    }
}

impl Eq for NodeSet<'_> {}

impl fmt::Debug for NodeSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.nodes
                    .iter()
                    .map(|&id| self.doc.element_name(id).unwrap_or(self.doc.kind(id).label())),
            )
            .finish()
    }
}

impl<'a> IntoIterator for &'a NodeSet<'_> {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Query entry points on [`Document`].
pub trait DocumentExt {
    /// A set holding the document element.
    fn root_set(&self) -> NodeSet<'_>;

    /// A set holding the document node, so queries can match the document
    /// element itself.
    fn document_set(&self) -> NodeSet<'_>;
}

impl DocumentExt for Document {
    fn root_set(&self) -> NodeSet<'_> {
        NodeSet::new(self, self.document_element())
    }

    fn document_set(&self) -> NodeSet<'_> {
        NodeSet::new(self, Some(self.document_node()))
    }
}
