//! Selector type definitions.

use std::fmt;

use xmlsel_core::{Attribute, QName};

/// A comma-separated list of selectors (e.g., "Q:first-child, .item > R").
///
/// A node matches the group if it matches any of its chains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorGroup {
    /// Alternatives in source order.
    pub chains: Vec<SelectorChain>,
}

impl SelectorGroup {
    /// Create a group from its chains.
    pub fn new(chains: Vec<SelectorChain>) -> Self {
        Self { chains }
    }

    /// Create a group holding a single chain.
    pub fn single(chain: SelectorChain) -> Self {
        Self {
            chains: vec![chain],
        }
    }
}

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", chain)?;
        }
        Ok(())
    }
}

/// A single complex selector (e.g., "div.item > span:first-child").
///
/// Parts are read left to right as ancestor to descendant. The rightmost part
/// is the subject that a matching node must satisfy itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorChain {
    /// Compound selectors in source order.
    pub parts: Vec<CompoundSelector>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
    /// Combinator relating the first part to the context node.
    ///
    /// `None` is the implicit descendant relation. Relative selectors such as
    /// `> Q` or `+ S` set it explicitly.
    pub leading: Option<Combinator>,
}

impl SelectorChain {
    /// Create a chain with a single compound selector.
    pub fn new(part: CompoundSelector) -> Self {
        Self {
            parts: vec![part],
            combinators: vec![],
            leading: None,
        }
    }

    /// Start the chain relative to the context node.
    pub fn relative_to_context(mut self, combinator: Combinator) -> Self {
        self.leading = Some(combinator);
        self
    }

    /// Append a part joined by `combinator`.
    pub fn then(mut self, combinator: Combinator, part: CompoundSelector) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(combinator);
        }
        self.parts.push(part);
        self
    }

    /// Add a descendant selector part.
    pub fn descendant(self, part: CompoundSelector) -> Self {
        self.then(Combinator::Descendant, part)
    }

    /// Add a child selector part.
    pub fn child(self, part: CompoundSelector) -> Self {
        self.then(Combinator::Child, part)
    }

    /// The combinator relating the first part to the context node.
    pub fn leading_combinator(&self) -> Combinator {
        self.leading.unwrap_or(Combinator::Descendant)
    }

    /// Returns true if every combinator in the chain moves downward.
    ///
    /// Matches of such a chain always lie inside the context node's subtree.
    pub fn stays_below_context(&self) -> bool {
        matches!(self.leading_combinator(), Combinator::Descendant | Combinator::Child)
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(leading) = self.leading {
            write!(f, "{} ", leading.symbol())?;
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    other => write!(f, " {} ", other.symbol())?,
                }
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A sequence of simple selectors that must all match the same node
/// (e.g., "item.tile[lang=en]:first-child").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompoundSelector {
    /// Simple selectors in source order.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Create a new empty compound selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type-only selector.
    pub fn type_only(name: impl Into<String>) -> Self {
        Self::new().with(SimpleSelector::Type(NameSelector::plain(name)))
    }

    /// Create a universal selector.
    pub fn universal() -> Self {
        Self::new().with(SimpleSelector::Universal)
    }

    /// Create a class-only selector.
    pub fn class_only(class: impl Into<String>) -> Self {
        Self::new().with_class(class)
    }

    /// Add any simple selector.
    pub fn with(mut self, simple: SimpleSelector) -> Self {
        self.simple_selectors.push(simple);
        self
    }

    /// Add an ID selector.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with(SimpleSelector::Id(id.into()))
    }

    /// Add a class selector.
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with(SimpleSelector::Class(class.into()))
    }

    /// Add an attribute selector.
    pub fn with_attribute(self, name: impl Into<String>, operator: AttrOperator) -> Self {
        self.with(SimpleSelector::Attribute(AttributeSelector {
            name: NameSelector::plain(name),
            operator,
        }))
    }

    /// Add a pseudo-class selector.
    pub fn with_pseudo(self, pseudo: PseudoClass) -> Self {
        self.with(SimpleSelector::Pseudo(pseudo))
    }

    /// Returns true if the compound holds no simple selectors.
    pub fn is_empty(&self) -> bool {
        self.simple_selectors.is_empty()
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in &self.simple_selectors {
            write!(f, "{}", simple)?;
        }
        Ok(())
    }
}

/// One condition on a single node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// `*` - matches any element.
    Universal,
    /// Element name (`Q`, `p|Q`, `*|Q`, `|Q`).
    Type(NameSelector),
    /// `#id` - the `id` attribute equals the value.
    Id(String),
    /// `.class` - the `class` attribute contains the word.
    Class(String),
    /// `[attr]`, `[attr=value]` and the other attribute operators.
    Attribute(AttributeSelector),
    /// `:pseudo` or `:pseudo(argument)`.
    Pseudo(PseudoClass),
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Universal => write!(f, "*"),
            SimpleSelector::Type(name) => write!(f, "{}", name),
            SimpleSelector::Id(id) => write!(f, "#{}", id),
            SimpleSelector::Class(class) => write!(f, ".{}", class),
            SimpleSelector::Attribute(attr) => write!(f, "{}", attr),
            SimpleSelector::Pseudo(pseudo) => write!(f, ":{}", pseudo),
        }
    }
}

/// How the prefix part of a name is constrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamePrefix {
    /// No `|` was written.
    Unspecified,
    /// `*|name` - any prefix or none.
    Any,
    /// `|name` - no prefix.
    None,
    /// `p|name` - exactly this prefix.
    Named(String),
}

/// A possibly prefixed name pattern used by type and attribute selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameSelector {
    /// Prefix constraint.
    pub prefix: NamePrefix,
    /// Local name, or `None` for `p|*`.
    pub local: Option<String>,
}

impl NameSelector {
    /// A name written without a prefix.
    pub fn plain(local: impl Into<String>) -> Self {
        Self {
            prefix: NamePrefix::Unspecified,
            local: Some(local.into()),
        }
    }

    /// A name written as `prefix|local`.
    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: NamePrefix::Named(prefix.into()),
            local: Some(local.into()),
        }
    }

    fn local_matches(&self, local: &str) -> bool {
        self.local.as_deref().is_none_or(|l| l == local)
    }

    /// Match an element name. A plain name compares the full qualified name.
    pub fn matches_element(&self, name: &QName) -> bool {
        match &self.prefix {
            NamePrefix::Unspecified => self.local.as_deref().is_none_or(|l| l == name.as_str()),
            NamePrefix::Any => self.local_matches(name.local()),
            NamePrefix::None => name.prefix().is_none() && self.local_matches(name.local()),
            NamePrefix::Named(p) => {
                name.prefix() == Some(p.as_str()) && self.local_matches(name.local())
            }
        }
    }

    /// Match an attribute name. A plain name matches the local name under any
    /// prefix, but never a namespace declaration unless written out in full.
    pub fn matches_attribute(&self, attr: &Attribute) -> bool {
        match &self.prefix {
            NamePrefix::Unspecified => match self.local.as_deref() {
                Some(l) if l == attr.name.as_str() => true,
                Some(l) => !attr.is_namespace_declaration() && attr.name.local() == l,
                None => !attr.is_namespace_declaration(),
            },
            NamePrefix::Any => !attr.is_namespace_declaration() && self.local_matches(attr.name.local()),
            NamePrefix::None => attr.name.prefix().is_none() && self.local_matches(attr.name.local()),
            NamePrefix::Named(p) => {
                attr.name.prefix() == Some(p.as_str()) && self.local_matches(attr.name.local())
            }
        }
    }
}

impl fmt::Display for NameSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            NamePrefix::Unspecified => {}
            NamePrefix::Any => write!(f, "*|")?,
            NamePrefix::None => write!(f, "|")?,
            NamePrefix::Named(p) => write!(f, "{}|", p)?,
        }
        write!(f, "{}", self.local.as_deref().unwrap_or("*"))
    }
}

/// An attribute condition (e.g., `[lang|=en]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name pattern.
    pub name: NameSelector,
    /// Value test.
    pub operator: AttrOperator,
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.name)?;
        if let Some((symbol, value)) = self.operator.symbol_and_value() {
            write!(f, "{}{:?}", symbol, value)?;
        }
        write!(f, "]")
    }
}

/// Attribute value operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[attr]` - present with any value.
    Exists,
    /// `[attr=value]` - exactly equal.
    Equals(String),
    /// `[attr~=value]` - one of the whitespace-separated words.
    ContainsWord(String),
    /// `[attr|=value]` - equal, or starts with `value-`.
    StartsWithPrefix(String),
    /// `[attr^=value]` - starts with.
    StartsWith(String),
    /// `[attr$=value]` - ends with.
    EndsWith(String),
    /// `[attr*=value]` - contains.
    Substring(String),
}

impl AttrOperator {
    /// Test an attribute value. All comparisons are case-sensitive.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            AttrOperator::Exists => true,
            AttrOperator::Equals(x) => value == x,
            AttrOperator::ContainsWord(x) => {
                !x.is_empty() && value.split_whitespace().any(|word| word == x)
            }
            AttrOperator::StartsWithPrefix(x) => {
                value == x
                    || value
                        .strip_prefix(x.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttrOperator::StartsWith(x) => !x.is_empty() && value.starts_with(x.as_str()),
            AttrOperator::EndsWith(x) => !x.is_empty() && value.ends_with(x.as_str()),
            AttrOperator::Substring(x) => !x.is_empty() && value.contains(x.as_str()),
        }
    }

    fn symbol_and_value(&self) -> Option<(&'static str, &str)> {
        match self {
            AttrOperator::Exists => None,
            AttrOperator::Equals(x) => Some(("=", x)),
            AttrOperator::ContainsWord(x) => Some(("~=", x)),
            AttrOperator::StartsWithPrefix(x) => Some(("|=", x)),
            AttrOperator::StartsWith(x) => Some(("^=", x)),
            AttrOperator::EndsWith(x) => Some(("$=", x)),
            AttrOperator::Substring(x) => Some(("*=", x)),
        }
    }
}

/// Combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (space): matches any descendant.
    Descendant,
    /// Child combinator (>): matches direct child only.
    Child,
    /// Adjacent sibling (+): matches immediately following sibling.
    AdjacentSibling,
    /// General sibling (~): matches any following sibling.
    GeneralSibling,
    /// Previous sibling (<): matches the immediately preceding sibling.
    PreviousSibling,
}

impl Combinator {
    /// The character written for this combinator.
    pub fn symbol(self) -> char {
        match self {
            Combinator::Descendant => ' ',
            Combinator::Child => '>',
            Combinator::AdjacentSibling => '+',
            Combinator::GeneralSibling => '~',
            Combinator::PreviousSibling => '<',
        }
    }
}

/// Pseudo-class selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// :first-child - first among element siblings.
    FirstChild,
    /// :last-child - last among element siblings.
    LastChild,
    /// :only-child - only element child of its parent.
    OnlyChild,
    /// :first-of-type - first sibling with the same name.
    FirstOfType,
    /// :last-of-type - last sibling with the same name.
    LastOfType,
    /// :only-of-type - only sibling with its name.
    OnlyOfType,
    /// :nth-child(An+B)
    NthChild(NthExpr),
    /// :nth-last-child(An+B)
    NthLastChild(NthExpr),
    /// :nth-of-type(An+B)
    NthOfType(NthExpr),
    /// :nth-last-of-type(An+B)
    NthLastOfType(NthExpr),
    /// :empty - no element children and no character data.
    Empty,
    /// :root - the document element.
    Root,
    /// :contains(text) - descendant text contains the string.
    Contains(String),
    /// :not(selectors) - negation.
    Not(SelectorGroup),
    /// :has(selectors) - a relative match exists.
    Has(SelectorGroup),
}

impl PseudoClass {
    /// The nth expression of a positional pseudo-class.
    pub fn nth_expr(&self) -> Option<NthExpr> {
        match self {
            PseudoClass::NthChild(expr)
            | PseudoClass::NthLastChild(expr)
            | PseudoClass::NthOfType(expr)
            | PseudoClass::NthLastOfType(expr) => Some(*expr),
            _ => None,
        }
    }

    /// Parse an argument-less pseudo-class name.
    pub fn from_css(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            "first-of-type" => Some(Self::FirstOfType),
            "last-of-type" => Some(Self::LastOfType),
            "only-of-type" => Some(Self::OnlyOfType),
            "empty" => Some(Self::Empty),
            "root" => Some(Self::Root),
            _ => None,
        }
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoClass::FirstChild => write!(f, "first-child"),
            PseudoClass::LastChild => write!(f, "last-child"),
            PseudoClass::OnlyChild => write!(f, "only-child"),
            PseudoClass::FirstOfType => write!(f, "first-of-type"),
            PseudoClass::LastOfType => write!(f, "last-of-type"),
            PseudoClass::OnlyOfType => write!(f, "only-of-type"),
            PseudoClass::NthChild(expr) => write!(f, "nth-child({})", expr),
            PseudoClass::NthLastChild(expr) => write!(f, "nth-last-child({})", expr),
            PseudoClass::NthOfType(expr) => write!(f, "nth-of-type({})", expr),
            PseudoClass::NthLastOfType(expr) => write!(f, "nth-last-of-type({})", expr),
            PseudoClass::Empty => write!(f, "empty"),
            PseudoClass::Root => write!(f, "root"),
            PseudoClass::Contains(text) => write!(f, "contains({:?})", text),
            PseudoClass::Not(inner) => write!(f, "not({})", inner),
            PseudoClass::Has(inner) => write!(f, "has({})", inner),
        }
    }
}

/// Expression for the `:nth-*` family (An+B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthExpr {
    /// Coefficient (A in An+B).
    pub a: i32,
    /// Offset (B in An+B).
    pub b: i32,
}

impl NthExpr {
    /// Create a new nth expression.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if a 0-indexed position matches this expression.
    pub fn matches(&self, index: usize) -> bool {
        let p = index as i64 + 1; // Convert to 1-indexed
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            p == b
        } else {
            let diff = p - b;
            diff % a == 0 && diff / a >= 0
        }
    }

    /// Returns true if no position can ever match.
    pub fn is_degenerate(&self) -> bool {
        self.a <= 0 && self.b <= 0
    }

    /// :nth-child(odd) = 2n+1.
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// :nth-child(even) = 2n.
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (2, 1) => write!(f, "odd"),
            (2, 0) => write!(f, "even"),
            (0, b) => write!(f, "{}", b),
            (1, 0) => write!(f, "n"),
            (-1, 0) => write!(f, "-n"),
            (a, 0) => write!(f, "{}n", a),
            (1, b) if b > 0 => write!(f, "n+{}", b),
            (1, b) => write!(f, "n{}", b),
            (-1, b) if b > 0 => write!(f, "-n+{}", b),
            (-1, b) => write!(f, "-n{}", b),
            (a, b) if b > 0 => write!(f, "{}n+{}", a, b),
            (a, b) => write!(f, "{}n{}", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_display() {
        let chain = SelectorChain::new(CompoundSelector::type_only("Q"))
            .descendant(CompoundSelector::class_only("a").with_pseudo(PseudoClass::FirstChild));
        assert_eq!(chain.to_string(), "Q .a:first-child");

        let chain = SelectorChain::new(CompoundSelector::type_only("section"))
            .child(CompoundSelector::universal());
        assert_eq!(chain.to_string(), "section > *");

        let chain = SelectorChain::new(CompoundSelector::type_only("S"))
            .relative_to_context(Combinator::AdjacentSibling);
        assert_eq!(chain.to_string(), "+ S");
    }

    #[test]
    fn compound_display() {
        let part = CompoundSelector::type_only("item")
            .with_class("tile")
            .with_attribute("lang", AttrOperator::StartsWithPrefix("en".into()))
            .with_pseudo(PseudoClass::NthChild(NthExpr::new(2, 1)));
        assert_eq!(part.to_string(), "item.tile[lang|=\"en\"]:nth-child(odd)");

        let group = SelectorGroup::new(vec![
            SelectorChain::new(CompoundSelector::type_only("a")),
            SelectorChain::new(CompoundSelector::new().with_id("b1")),
        ]);
        assert_eq!(group.to_string(), "a, #b1");
    }

    #[test]
    fn nth_expr_matches() {
        // :nth-child(3)
        let expr = NthExpr::new(0, 3);
        assert!(!expr.matches(0)); // 1st child
        assert!(!expr.matches(1)); // 2nd child
        assert!(expr.matches(2)); // 3rd child
        assert!(!expr.matches(3)); // 4th child

        // :nth-child(odd) = 2n+1
        let expr = NthExpr::odd();
        assert!(expr.matches(0)); // 1st child
        assert!(!expr.matches(1)); // 2nd child
        assert!(expr.matches(2)); // 3rd child
        assert!(!expr.matches(3)); // 4th child

        // :nth-child(-n+3)
        let expr = NthExpr::new(-1, 3);
        assert!(expr.matches(0));
        assert!(expr.matches(2));
        assert!(!expr.matches(3));

        // :nth-child(n-4) matches every position
        let expr = NthExpr::new(1, -4);
        assert!((0..10).all(|i| expr.matches(i)));
    }

    #[test]
    fn nth_expr_degenerate() {
        assert!(NthExpr::new(0, 0).is_degenerate());
        assert!(NthExpr::new(0, -1).is_degenerate());
        assert!(NthExpr::new(-1, 0).is_degenerate());
        assert!(NthExpr::new(-2, 0).is_degenerate());
        assert!(!NthExpr::new(0, 1).is_degenerate());
        assert!(!NthExpr::new(-1, 3).is_degenerate());
        assert!(!NthExpr::new(1, -7).is_degenerate());

        for expr in [NthExpr::new(0, 0), NthExpr::new(-1, 0), NthExpr::new(-2, 0)] {
            assert!((0..20).all(|i| !expr.matches(i)), "{expr} matched");
        }
    }

    #[test]
    fn nth_expr_display() {
        assert_eq!(NthExpr::new(-1, 3).to_string(), "-n+3");
        assert_eq!(NthExpr::new(3, -1).to_string(), "3n-1");
        assert_eq!(NthExpr::new(1, -2).to_string(), "n-2");
        assert_eq!(NthExpr::even().to_string(), "even");
    }

    #[test]
    fn attribute_operators() {
        assert!(AttrOperator::ContainsWord("foo".into()).matches("bar foo"));
        assert!(!AttrOperator::ContainsWord("foo".into()).matches("foobar"));
        assert!(AttrOperator::StartsWithPrefix("en".into()).matches("en-US"));
        assert!(AttrOperator::StartsWithPrefix("en".into()).matches("en"));
        assert!(!AttrOperator::StartsWithPrefix("en".into()).matches("english"));
        assert!(AttrOperator::StartsWith("http://".into()).matches("http://x"));
        assert!(!AttrOperator::StartsWith("http://".into()).matches("test/http://x"));
        assert!(AttrOperator::EndsWith(".png".into()).matches("image.png"));
        assert!(AttrOperator::Substring("pter 2".into()).matches("Chapter 2: Details"));

        // empty values never match the substring family
        assert!(!AttrOperator::StartsWith(String::new()).matches("x"));
        assert!(!AttrOperator::EndsWith(String::new()).matches("x"));
        assert!(!AttrOperator::Substring(String::new()).matches("x"));
        assert!(AttrOperator::Equals(String::new()).matches(""));
    }

    #[test]
    fn name_selector_prefixes() {
        let plain = NameSelector::plain("Q");
        assert!(plain.matches_element(&QName::new("Q")));
        assert!(!plain.matches_element(&QName::new("p:Q")));

        let prefixed = NameSelector::prefixed("p", "Q");
        assert!(prefixed.matches_element(&QName::new("p:Q")));
        assert!(!prefixed.matches_element(&QName::new("Q")));

        let any = NameSelector {
            prefix: NamePrefix::Any,
            local: Some("Q".into()),
        };
        assert!(any.matches_element(&QName::new("z:Q")));
        assert!(any.matches_element(&QName::new("Q")));

        let attr = NameSelector::plain("A");
        assert!(attr.matches_attribute(&Attribute::new("p:A", "1")));
        assert!(attr.matches_attribute(&Attribute::new("A", "1")));
        assert!(!NameSelector::plain("p").matches_attribute(&Attribute::new("xmlns:p", "urn")));
        assert!(NameSelector::plain("xmlns:p").matches_attribute(&Attribute::new("xmlns:p", "urn")));
    }
}
