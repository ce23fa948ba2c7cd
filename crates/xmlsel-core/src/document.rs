//! The document arena and its read-only navigation API.

use slotmap::SlotMap;
use static_assertions::assert_impl_all;

use crate::node::{Attribute, Element, Node, NodeId, NodeKind};

/// An immutable XML tree.
///
/// The tree is stored in a [`SlotMap`] arena. A single [`NodeKind::Document`]
/// node sits at the top and owns the document element together with any
/// top-level comments and processing instructions.
///
/// All methods taking a [`NodeId`] expect an id produced by this document and
/// panic when given an id from another document.
///
/// # Related Types
///
/// - [`TreeBuilder`](crate::TreeBuilder) - Builds documents event by event
/// - [`ParseOptions`](crate::ParseOptions) - Controls XML text parsing
#[derive(Debug, Clone)]
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    element: Option<NodeId>,
}

assert_impl_all!(Document: Send, Sync);

impl Document {
    /// Create a document holding only the document node.
    pub(crate) fn empty() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeKind::Document, None, 0, 0));
        Self {
            nodes,
            root,
            element: None,
        }
    }

    /// Append a new node as the last child of `parent`.
    pub(crate) fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let order = self.nodes.len();
        let index = self.nodes[parent].children.len();
        let id = self.nodes.insert(Node::new(kind, Some(parent), order, index));
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn set_document_element(&mut self, id: NodeId) {
        self.element = Some(id);
    }

    /// Number of nodes, including the document node.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the document holds only the document node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The top-level document node.
    #[inline]
    pub fn document_node(&self) -> NodeId {
        self.root
    }

    /// The single top-level element.
    ///
    /// Documents produced by the builder always have one.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element
    }

    /// Get a node, or `None` if the id is unknown.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The kind (and payload) of a node.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    /// The parent of a node.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// All children of a node, including text and comments.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// Pre-order position of a node. Smaller means earlier in the document.
    #[inline]
    pub fn order(&self, id: NodeId) -> usize {
        self.get(id).order
    }

    /// The element payload of a node.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).as_element()
    }

    /// Returns true if the node is an element.
    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_element()
    }

    /// Qualified name of an element node.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Attribute value looked up by exact qualified name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    /// All attributes of an element (empty for other kinds).
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|e| e.attributes.as_slice()).unwrap_or(&[])
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.get(id)
            .children
            .iter()
            .copied()
            .filter(move |&child| self.is_element(child))
    }

    /// The first element child, skipping text, comments and the like.
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next()
    }

    /// The last element child, skipping text, comments and the like.
    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next_back()
    }

    /// Element siblings after `id`, nearest first.
    pub fn following_element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let node = self.get(id);
        let siblings: &[NodeId] = match node.parent {
            Some(parent) => &self.get(parent).children[node.index + 1..],
            None => &[],
        };
        siblings.iter().copied().filter(move |&s| self.is_element(s))
    }

    /// Element siblings before `id`, nearest first.
    pub fn preceding_element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let node = self.get(id);
        let siblings: &[NodeId] = match node.parent {
            Some(parent) => &self.get(parent).children[..node.index],
            None => &[],
        };
        siblings.iter().rev().copied().filter(move |&s| self.is_element(s))
    }

    /// The nearest following element sibling.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.following_element_siblings(id).next()
    }

    /// The nearest preceding element sibling.
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_element_siblings(id).next()
    }

    /// Ancestors of a node, nearest first, ending with the document node.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.get(id).parent,
        }
    }

    /// Descendants of a node in document order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = self.get(id).children.iter().rev().copied().collect();
        Descendants { doc: self, stack }
    }

    /// Concatenated text and CDATA content of all descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(data) = self.get(id).character_data() {
            text.push_str(data);
        }
        for descendant in self.descendants(id) {
            if let Some(data) = self.get(descendant).character_data() {
                text.push_str(data);
            }
        }
        text
    }

    /// Sort ids into document order and drop duplicates.
    pub fn sort_in_document_order(&self, ids: &mut Vec<NodeId>) {
        ids.sort_by_key(|&id| self.order(id));
        ids.dedup();
    }
}

/// Iterator over the ancestors of a node. See [`Document::ancestors`].
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree. See [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
