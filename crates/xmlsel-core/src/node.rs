//! Node types stored in the document arena.
//!
//! Every node lives in a [`Document`](crate::Document) and is addressed by a
//! [`NodeId`]. Nodes hold their parent as a plain handle and own the ordered
//! list of their children's handles, so walking up or across the tree never
//! needs reference counting.

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// A handle to a node inside a [`Document`](crate::Document).
    ///
    /// `NodeId`s are only meaningful for the document that created them.
    /// Comparing ids is identity comparison of nodes.
    pub struct NodeId;
}

/// A possibly prefixed XML name such as `item` or `p:item`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    raw: String,
    colon: Option<usize>,
}

impl QName {
    /// Create a name from its qualified form.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let colon = raw.find(':');
        Self { raw, colon }
    }

    /// The full qualified name (`p:item`).
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The prefix before the colon, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.colon.map(|pos| &self.raw[..pos])
    }

    /// The local part after the colon (or the whole name).
    pub fn local(&self) -> &str {
        match self.colon {
            Some(pos) => &self.raw[pos + 1..],
            None => &self.raw,
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for QName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written in the source.
    pub name: QName,
    /// Unescaped attribute value.
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::new(name),
            value: value.into(),
        }
    }

    /// Returns true if this is a namespace declaration (`xmlns` or `xmlns:p`).
    pub fn is_namespace_declaration(&self) -> bool {
        self.name.as_str() == "xmlns" || self.name.prefix() == Some("xmlns")
    }
}

/// Element payload: name, namespace and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified element name.
    pub name: QName,
    /// Namespace URI bound to the element's prefix (or the default namespace).
    pub namespace: Option<String>,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Look up an attribute value by its exact qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.as_str() == name)
            .map(|a| a.value.as_str())
    }

    /// Iterate over attribute values whose local name is `local`, whatever the prefix.
    pub fn attributes_by_local<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |a| a.name.local() == local)
            .map(|a| a.value.as_str())
    }

    /// Returns true if the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|v| v.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// The kind of a node, with its kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The invisible root that owns the document element.
    Document,
    /// An element.
    Element(Element),
    /// Character data.
    Text(String),
    /// `<!-- ... -->`
    Comment(String),
    /// `<?target data?>`
    ProcessingInstruction {
        /// Instruction target.
        target: String,
        /// Everything after the target, if present.
        data: Option<String>,
    },
    /// `<![CDATA[ ... ]]>`
    CData(String),
}

impl NodeKind {
    /// Short lowercase label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Element(_) => "element",
            NodeKind::Text(_) => "text",
            NodeKind::Comment(_) => "comment",
            NodeKind::ProcessingInstruction { .. } => "pi",
            NodeKind::CData(_) => "cdata",
        }
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) order: usize,
    pub(crate) index: usize,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>, order: usize, index: usize) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            order,
            index,
        }
    }

    /// The node's kind and payload.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent handle (`None` only for the document node).
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in document order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Pre-order position of this node in its document.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Position of this node within its parent's child list.
    #[inline]
    pub fn index_in_parent(&self) -> usize {
        self.index
    }

    /// The element payload, if this node is an element.
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns true if this node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    /// Character content of a text or CDATA node.
    pub fn character_data(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) | NodeKind::CData(text) => Some(text),
            _ => None,
        }
    }
}
