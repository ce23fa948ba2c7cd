//! Selector evaluation over a document.
//!
//! Every chain is evaluated relative to a scope node. A chain without a
//! leading combinator finds descendants of the scope; `> Q` finds children and
//! `+ Q`, `~ Q` and `< Q` find siblings of the scope. Ancestor steps in the
//! middle of a chain never climb past the scope.

use tracing::trace;
use xmlsel_core::logging::targets;
use xmlsel_core::{Document, NodeId};

use crate::selector::{ChainMatcher, SelectorChain, SelectorGroup};

/// Find every element matching `group` relative to any of the `context` nodes.
///
/// The result is in document order without duplicates.
pub fn find(doc: &Document, group: &SelectorGroup, context: &[NodeId]) -> Vec<NodeId> {
    let mut found = Vec::new();
    for chain in &group.chains {
        let before = found.len();
        for &scope in context {
            let mut matcher = ChainMatcher::new(doc, chain, scope);
            found.extend(candidates(doc, chain, scope).filter(|&node| matcher.matches(node)));
        }
        trace!(
            target: targets::ENGINE,
            chain = %chain,
            contexts = context.len(),
            matched = found.len() - before,
            "chain evaluated"
        );
    }
    doc.sort_in_document_order(&mut found);
    found
}

/// Check whether `node` matches `group` as its subject, with the document node
/// as scope.
pub fn matches(doc: &Document, group: &SelectorGroup, node: NodeId) -> bool {
    let scope = doc.document_node();
    group
        .chains
        .iter()
        .any(|chain| ChainMatcher::new(doc, chain, scope).matches(node))
}

/// Check whether any element matches `group` relative to `scope`.
pub fn has_match(doc: &Document, group: &SelectorGroup, scope: NodeId) -> bool {
    group.chains.iter().any(|chain| {
        let mut matcher = ChainMatcher::new(doc, chain, scope);
        candidates(doc, chain, scope).any(|node| matcher.matches(node))
    })
}

/// Elements that could match `chain` relative to `scope`.
fn candidates<'d>(
    doc: &'d Document,
    chain: &SelectorChain,
    scope: NodeId,
) -> impl Iterator<Item = NodeId> + 'd {
    let region = if chain.stays_below_context() {
        Some(scope)
    } else {
        doc.parent(scope)
    };
    region
        .into_iter()
        .flat_map(move |root| doc.descendants(root))
        .filter(move |&node| doc.is_element(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const XML: &str = "<r><a id='1'><b id='2'/><b id='3'><b id='4'/></b></a><c id='5'/><b id='6'/></r>";

    fn ids(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| doc.attribute(n, "id").unwrap_or_default().to_string())
            .collect()
    }

    fn find_ids(doc: &Document, selector: &str, context: &[NodeId]) -> Vec<String> {
        ids(doc, &find(doc, &parse(selector).unwrap(), context))
    }

    fn by_id(doc: &Document, id: &str) -> NodeId {
        doc.descendants(doc.document_node())
            .find(|&n| doc.attribute(n, "id") == Some(id))
            .unwrap()
    }

    #[test]
    fn find_in_document_order() {
        let doc = Document::parse_str(XML).unwrap();
        let root = [doc.document_node()];
        assert_eq!(find_ids(&doc, "b", &root), ["2", "3", "4", "6"]);
        assert_eq!(find_ids(&doc, "c, a", &root), ["1", "5"]);
        assert_eq!(find_ids(&doc, "b b", &root), ["4"]);
        assert_eq!(find_ids(&doc, "a > b", &root), ["2", "3"]);
    }

    #[test]
    fn find_deduplicates_across_contexts() {
        let doc = Document::parse_str(XML).unwrap();
        let context = [by_id(&doc, "1"), by_id(&doc, "3")];
        assert_eq!(find_ids(&doc, "b", &context), ["2", "3", "4"]);
    }

    #[test]
    fn find_relative_to_context() {
        let doc = Document::parse_str(XML).unwrap();
        let a = [by_id(&doc, "1")];
        assert_eq!(find_ids(&doc, "> b", &a), ["2", "3"]);
        assert_eq!(find_ids(&doc, "+ c", &a), ["5"]);
        assert_eq!(find_ids(&doc, "~ b", &a), ["6"]);
        assert_eq!(find_ids(&doc, "+ b", &a), Vec::<String>::new());

        let c = [by_id(&doc, "5")];
        assert_eq!(find_ids(&doc, "< a", &c), ["1"]);
        assert_eq!(find_ids(&doc, "< a > b", &c), ["2", "3"]);
    }

    #[test]
    fn scope_hides_outer_ancestors() {
        let doc = Document::parse_str(XML).unwrap();
        let inner = [by_id(&doc, "3")];
        assert_eq!(find_ids(&doc, "a b", &inner), Vec::<String>::new());
        assert_eq!(find_ids(&doc, "b", &inner), ["4"]);
    }

    #[test]
    fn matches_and_has_match() {
        let doc = Document::parse_str(XML).unwrap();
        let group = parse("a b:last-child").unwrap();
        assert!(matches(&doc, &group, by_id(&doc, "3")));
        assert!(!matches(&doc, &group, by_id(&doc, "6")));
        assert!(!matches(&doc, &group, doc.document_node()));

        let b = parse("b").unwrap();
        assert!(has_match(&doc, &b, by_id(&doc, "1")));
        assert!(!has_match(&doc, &b, by_id(&doc, "2")));
    }
}
