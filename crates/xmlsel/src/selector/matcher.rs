//! Selector matching algorithm.

use std::collections::HashSet;

use xmlsel_core::{Document, Element, NodeId, NodeKind};

use super::{
    AttributeSelector, Combinator, CompoundSelector, PseudoClass, SelectorChain, SimpleSelector,
};
use crate::engine;

/// An element being tested against a selector.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// The document holding the element.
    pub doc: &'a Document,
    /// The element's id.
    pub node: NodeId,
    /// The element payload.
    pub element: &'a Element,
}

impl<'a> MatchContext<'a> {
    /// Create a context, or `None` if the node is not an element.
    pub fn new(doc: &'a Document, node: NodeId) -> Option<Self> {
        doc.element(node).map(|element| Self { doc, node, element })
    }

    /// Position among all element siblings.
    pub fn sibling_info(&self) -> SiblingInfo {
        match self.doc.parent(self.node) {
            Some(parent) => SiblingInfo::locate(self.doc.element_children(parent), self.node),
            None => SiblingInfo::ONLY,
        }
    }

    /// Position among element siblings sharing this element's qualified name.
    pub fn type_sibling_info(&self) -> SiblingInfo {
        let Some(parent) = self.doc.parent(self.node) else {
            return SiblingInfo::ONLY;
        };
        let name = self.element.name.as_str();
        let same_type = self
            .doc
            .element_children(parent)
            .filter(|&sibling| self.doc.element_name(sibling) == Some(name));
        SiblingInfo::locate(same_type, self.node)
    }
}

/// Sibling position information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingInfo {
    /// Zero-based index among siblings.
    pub index: usize,
    /// Total number of siblings (including self).
    pub count: usize,
}

impl SiblingInfo {
    const ONLY: SiblingInfo = SiblingInfo { index: 0, count: 1 };

    fn locate(siblings: impl Iterator<Item = NodeId>, node: NodeId) -> Self {
        let mut info = SiblingInfo { index: 0, count: 0 };
        for sibling in siblings {
            if sibling == node {
                info.index = info.count;
            }
            info.count += 1;
        }
        info
    }

    /// Returns true if this is the first sibling.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Returns true if this is the last sibling.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// Returns true if this is the only child.
    pub fn is_only(&self) -> bool {
        self.count == 1
    }

    /// Zero-based index counted from the last sibling.
    pub fn index_from_end(&self) -> usize {
        self.count - 1 - self.index
    }
}

/// Evaluates compound and simple selectors against a single element.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Check if every simple selector of a compound matches the element.
    pub fn part_matches(part: &CompoundSelector, context: &MatchContext<'_>) -> bool {
        part.simple_selectors
            .iter()
            .all(|simple| Self::simple_matches(simple, context))
    }

    /// Check a single simple selector.
    pub fn simple_matches(simple: &SimpleSelector, context: &MatchContext<'_>) -> bool {
        match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(name) => name.matches_element(&context.element.name),
            SimpleSelector::Id(id) => context.element.attribute("id") == Some(id.as_str()),
            SimpleSelector::Class(class) => context.element.has_class(class),
            SimpleSelector::Attribute(attr) => Self::attribute_matches(attr, context.element),
            SimpleSelector::Pseudo(pseudo) => Self::pseudo_matches(pseudo, context),
        }
    }

    fn attribute_matches(selector: &AttributeSelector, element: &Element) -> bool {
        element
            .attributes
            .iter()
            .any(|attr| selector.name.matches_attribute(attr) && selector.operator.matches(&attr.value))
    }

    fn pseudo_matches(pseudo: &PseudoClass, context: &MatchContext<'_>) -> bool {
        let doc = context.doc;
        match pseudo {
            PseudoClass::FirstChild => context.sibling_info().is_first(),
            PseudoClass::LastChild => context.sibling_info().is_last(),
            PseudoClass::OnlyChild => context.sibling_info().is_only(),
            PseudoClass::FirstOfType => context.type_sibling_info().is_first(),
            PseudoClass::LastOfType => context.type_sibling_info().is_last(),
            PseudoClass::OnlyOfType => context.type_sibling_info().is_only(),
            PseudoClass::NthChild(expr) => expr.matches(context.sibling_info().index),
            PseudoClass::NthLastChild(expr) => expr.matches(context.sibling_info().index_from_end()),
            PseudoClass::NthOfType(expr) => expr.matches(context.type_sibling_info().index),
            PseudoClass::NthLastOfType(expr) => {
                expr.matches(context.type_sibling_info().index_from_end())
            }
            PseudoClass::Empty => doc.children(context.node).iter().all(|&child| match doc.kind(child) {
                NodeKind::Element(_) => false,
                NodeKind::Text(text) | NodeKind::CData(text) => text.is_empty(),
                _ => true,
            }),
            PseudoClass::Root => doc.document_element() == Some(context.node),
            PseudoClass::Contains(text) => doc.text_content(context.node).contains(text.as_str()),
            PseudoClass::Not(inner) => !engine::matches(doc, inner, context.node),
            PseudoClass::Has(inner) => engine::has_match(doc, inner, context.node),
        }
    }
}

/// Matches one selector chain against elements, relative to a fixed scope node.
///
/// The chain is walked right to left. Pairs of (part index, node) that failed
/// are remembered so repeated descendant and sibling steps stay linear.
pub struct ChainMatcher<'a> {
    doc: &'a Document,
    chain: &'a SelectorChain,
    scope: NodeId,
    failed: HashSet<(usize, NodeId)>,
}

impl<'a> ChainMatcher<'a> {
    /// Create a matcher for `chain` scoped to `scope`.
    pub fn new(doc: &'a Document, chain: &'a SelectorChain, scope: NodeId) -> Self {
        Self {
            doc,
            chain,
            scope,
            failed: HashSet::new(),
        }
    }

    /// Check if `node` is a subject of the chain.
    pub fn matches(&mut self, node: NodeId) -> bool {
        match self.chain.parts.len() {
            0 => false,
            len => self.matches_from(len - 1, node),
        }
    }

    fn matches_from(&mut self, idx: usize, node: NodeId) -> bool {
        if self.failed.contains(&(idx, node)) {
            return false;
        }
        let matched = self.evaluate(idx, node);
        if !matched {
            self.failed.insert((idx, node));
        }
        matched
    }

    fn evaluate(&mut self, idx: usize, node: NodeId) -> bool {
        let doc = self.doc;
        let Some(context) = MatchContext::new(doc, node) else {
            return false;
        };
        if !SelectorMatcher::part_matches(&self.chain.parts[idx], &context) {
            return false;
        }
        if idx == 0 {
            return self.related_to_scope(node);
        }

        let left = idx - 1;
        let scope = self.scope;
        match self.chain.combinators[left] {
            Combinator::Descendant => doc
                .ancestors(node)
                .take_while(|&ancestor| ancestor != scope)
                .any(|ancestor| self.matches_from(left, ancestor)),
            Combinator::Child => match doc.parent(node) {
                Some(parent) if parent != scope => self.matches_from(left, parent),
                _ => false,
            },
            Combinator::AdjacentSibling => doc
                .prev_element_sibling(node)
                .is_some_and(|prev| self.matches_from(left, prev)),
            Combinator::GeneralSibling => doc
                .preceding_element_siblings(node)
                .any(|prev| self.matches_from(left, prev)),
            // `A < B`: B sits immediately before A.
            Combinator::PreviousSibling => doc
                .next_element_sibling(node)
                .is_some_and(|next| self.matches_from(left, next)),
        }
    }

    /// Check the leading relation between the leftmost part and the scope.
    fn related_to_scope(&self, node: NodeId) -> bool {
        let doc = self.doc;
        let scope = self.scope;
        match self.chain.leading_combinator() {
            Combinator::Descendant => doc.ancestors(node).any(|ancestor| ancestor == scope),
            Combinator::Child => doc.parent(node) == Some(scope),
            Combinator::AdjacentSibling => doc.next_element_sibling(scope) == Some(node),
            Combinator::GeneralSibling => doc.preceding_element_siblings(node).any(|s| s == scope),
            Combinator::PreviousSibling => doc.prev_element_sibling(scope) == Some(node),
        }
    }
}
