//! Selector parser using the `cssparser` crate.
//!
//! Parsing happens in two passes. A character-level prescan checks bracket
//! balance (so the error can name the offending bracket) and escapes raw line
//! breaks inside quoted strings. The prepared text is then tokenized by
//! `cssparser` and turned into a [`SelectorGroup`].

use std::borrow::Cow;

use cssparser::{
    BasicParseErrorKind, ParseErrorKind, Parser, ParserInput, Token, match_ignore_ascii_case,
};
use tracing::{trace, warn};
use xmlsel_core::logging::targets;

use super::error::{CssError, ParseError, SelectorErrorKind, describe_basic, from_css};
use crate::selector::{
    AttrOperator, AttributeSelector, Combinator, CompoundSelector, NamePrefix, NameSelector,
    NthExpr, PseudoClass, SelectorChain, SelectorGroup, SimpleSelector,
};

/// Maximum nesting of `:not()` and `:has()` arguments.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Parse a comma-separated selector group.
pub(crate) fn parse_selector_group(text: &str) -> Result<SelectorGroup, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptySelector);
    }
    let prepared = prescan(text)?;

    let mut input = ParserInput::new(&prepared);
    let mut parser = Parser::new(&mut input);
    let group = parse_group(&mut parser, 0).map_err(from_css)?;

    trace!(target: targets::PARSER, selector = text, chains = group.chains.len(), "selector parsed");
    Ok(group)
}

/// Check bracket balance outside quoted strings and escape raw line breaks
/// inside them.
fn prescan(text: &str) -> Result<Cow<'_, str>, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.chars().enumerate() {
        let column = i + 1;
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match (quote, c) {
            (_, '\\') => {
                escaped = true;
                out.push(c);
            }
            (Some(q), c) if c == q => {
                quote = None;
                out.push(c);
            }
            (Some(_), '\n' | '\r' | '\x0c') => {
                changed = true;
                out.push_str(match c {
                    '\n' => "\\a ",
                    '\r' => "\\d ",
                    _ => "\\c ",
                });
            }
            (Some(_), c) => out.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                out.push(c);
            }
            (None, '[' | '(') => {
                open.push((c, column));
                out.push(c);
            }
            (None, ']' | ')') => {
                let expected = if c == ']' { '[' } else { '(' };
                match open.pop() {
                    Some((bracket, _)) if bracket == expected => out.push(c),
                    _ => return Err(ParseError::UnbalancedBracket { bracket: c, column }),
                }
            }
            (None, c) => out.push(c),
        }
    }

    if let Some(&(bracket, column)) = open.first() {
        return Err(ParseError::UnbalancedBracket { bracket, column });
    }
    Ok(if changed { Cow::Owned(out) } else { Cow::Borrowed(text) })
}

fn parse_group<'i>(p: &mut Parser<'i, '_>, depth: usize) -> Result<SelectorGroup, CssError<'i>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(p.new_custom_error(SelectorErrorKind::NestingTooDeep(MAX_NESTING_DEPTH)));
    }
    let chains = p.parse_comma_separated(|p| parse_chain(p, depth))?;
    Ok(SelectorGroup::new(chains))
}

fn parse_chain<'i>(p: &mut Parser<'i, '_>, depth: usize) -> Result<SelectorChain, CssError<'i>> {
    p.skip_whitespace();
    if p.is_exhausted() {
        return Err(p.new_custom_error(SelectorErrorKind::EmptySelector));
    }

    let leading = try_combinator(p);
    let mut chain = SelectorChain::new(expect_compound(p, depth)?);
    chain.leading = leading;

    while let Some(combinator) = next_combinator(p)? {
        chain = chain.then(combinator, expect_compound(p, depth)?);
    }
    Ok(chain)
}

fn combinator_for(c: char) -> Option<Combinator> {
    match c {
        '>' => Some(Combinator::Child),
        '+' => Some(Combinator::AdjacentSibling),
        '~' => Some(Combinator::GeneralSibling),
        '<' => Some(Combinator::PreviousSibling),
        _ => None,
    }
}

/// Consume a combinator at the start of a relative selector.
fn try_combinator(p: &mut Parser<'_, '_>) -> Option<Combinator> {
    let state = p.state();
    if let Ok(&Token::Delim(c)) = p.next() {
        if let Some(combinator) = combinator_for(c) {
            return Some(combinator);
        }
    }
    p.reset(&state);
    None
}

/// Read the combinator after a compound, or `None` at the end of the chain.
///
/// Whitespace followed by anything other than an explicit combinator is the
/// descendant combinator.
fn next_combinator<'i>(p: &mut Parser<'i, '_>) -> Result<Option<Combinator>, CssError<'i>> {
    let mut saw_whitespace = false;
    loop {
        let state = p.state();
        match p.next_including_whitespace() {
            Err(_) => return Ok(None),
            Ok(Token::WhiteSpace(_)) => saw_whitespace = true,
            Ok(&Token::Delim(c)) if combinator_for(c).is_some() => return Ok(combinator_for(c)),
            Ok(_) if saw_whitespace => {
                p.reset(&state);
                return Ok(Some(Combinator::Descendant));
            }
            Ok(token) => {
                let token = token.clone();
                return Err(p.new_unexpected_token_error(token));
            }
        }
    }
}

fn unexpected_here<'i>(p: &mut Parser<'i, '_>) -> CssError<'i> {
    match p.next_including_whitespace() {
        Ok(token) => {
            let token = token.clone();
            p.new_unexpected_token_error(token)
        }
        Err(error) => error.into(),
    }
}

fn expect_compound<'i>(
    p: &mut Parser<'i, '_>,
    depth: usize,
) -> Result<CompoundSelector, CssError<'i>> {
    p.skip_whitespace();
    let compound = parse_compound(p, depth)?;
    if compound.is_empty() {
        return Err(unexpected_here(p));
    }
    Ok(compound)
}

/// Parse simple selectors until whitespace, a combinator or the end.
fn parse_compound<'i>(
    p: &mut Parser<'i, '_>,
    depth: usize,
) -> Result<CompoundSelector, CssError<'i>> {
    let mut compound = CompoundSelector::new();

    loop {
        let state = p.state();
        let token = match p.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        let simple = match token {
            Token::Ident(name) if compound.is_empty() => {
                if try_namespace_bar(p) {
                    SimpleSelector::Type(NameSelector {
                        prefix: NamePrefix::Named(name.to_string()),
                        local: expect_local(p)?,
                    })
                } else {
                    SimpleSelector::Type(NameSelector::plain(name.to_string()))
                }
            }
            Token::Delim('*') if compound.is_empty() => {
                if try_namespace_bar(p) {
                    SimpleSelector::Type(NameSelector {
                        prefix: NamePrefix::Any,
                        local: expect_local(p)?,
                    })
                } else {
                    SimpleSelector::Universal
                }
            }
            Token::Delim('|') if compound.is_empty() => SimpleSelector::Type(NameSelector {
                prefix: NamePrefix::None,
                local: expect_local(p)?,
            }),
            Token::IDHash(id) | Token::Hash(id) => SimpleSelector::Id(id.to_string()),
            Token::Delim('.') => match p.next_including_whitespace()?.clone() {
                Token::Ident(class) => SimpleSelector::Class(class.to_string()),
                other => return Err(p.new_unexpected_token_error(other)),
            },
            Token::SquareBracketBlock => {
                SimpleSelector::Attribute(p.parse_nested_block(parse_attribute_block)?)
            }
            Token::Colon => SimpleSelector::Pseudo(parse_pseudo(p, depth)?),
            _ => {
                p.reset(&state);
                break;
            }
        };
        compound.simple_selectors.push(simple);
    }

    Ok(compound)
}

/// Consume a `|` directly following a name.
fn try_namespace_bar(p: &mut Parser<'_, '_>) -> bool {
    let state = p.state();
    if matches!(p.next_including_whitespace(), Ok(Token::Delim('|'))) {
        return true;
    }
    p.reset(&state);
    false
}

/// Read the local part after `prefix|`: a name, or `*` for any name.
fn expect_local<'i>(p: &mut Parser<'i, '_>) -> Result<Option<String>, CssError<'i>> {
    match p.next_including_whitespace()?.clone() {
        Token::Ident(local) => Ok(Some(local.to_string())),
        Token::Delim('*') => Ok(None),
        other => Err(p.new_unexpected_token_error(other)),
    }
}

/// Parse the inside of `[...]`, reporting any token-level failure as a
/// malformed attribute.
fn parse_attribute_block<'i>(p: &mut Parser<'i, '_>) -> Result<AttributeSelector, CssError<'i>> {
    parse_attribute(p).map_err(|error| {
        let CssError { kind, location } = error;
        let kind = match kind {
            ParseErrorKind::Basic(basic) => ParseErrorKind::Custom(
                SelectorErrorKind::MalformedAttribute(format!("unexpected {}", describe_basic(&basic))),
            ),
            custom => custom,
        };
        CssError { kind, location }
    })
}

fn parse_attribute<'i>(p: &mut Parser<'i, '_>) -> Result<AttributeSelector, CssError<'i>> {
    p.skip_whitespace();
    let name = parse_attribute_name(p)?;

    let operator_token = match p.next() {
        Ok(token) => token.clone(),
        Err(_) => {
            return Ok(AttributeSelector {
                name,
                operator: AttrOperator::Exists,
            });
        }
    };
    let operator: fn(String) -> AttrOperator = match operator_token {
        Token::Delim('=') => AttrOperator::Equals,
        Token::IncludeMatch => AttrOperator::ContainsWord,
        Token::DashMatch => AttrOperator::StartsWithPrefix,
        Token::PrefixMatch => AttrOperator::StartsWith,
        Token::SuffixMatch => AttrOperator::EndsWith,
        Token::SubstringMatch => AttrOperator::Substring,
        other => return Err(p.new_unexpected_token_error(other)),
    };

    let value = quoted_or_raw(p)
        .map_err(|message| p.new_custom_error(SelectorErrorKind::MalformedAttribute(message)))?
        .ok_or_else(|| {
            p.new_custom_error(SelectorErrorKind::MalformedAttribute("missing value".to_string()))
        })?;
    Ok(AttributeSelector {
        name,
        operator: operator(value),
    })
}

/// Attribute names: `A`, `p|A`, `p:A`, `*|A` and `|A`.
fn parse_attribute_name<'i>(p: &mut Parser<'i, '_>) -> Result<NameSelector, CssError<'i>> {
    match p.next_including_whitespace()?.clone() {
        Token::Ident(first) => {
            let state = p.state();
            match p.next_including_whitespace() {
                Ok(Token::Delim('|')) => Ok(NameSelector {
                    prefix: NamePrefix::Named(first.to_string()),
                    local: expect_local(p)?,
                }),
                Ok(Token::Colon) => match p.next_including_whitespace()?.clone() {
                    Token::Ident(local) => Ok(NameSelector::prefixed(first.to_string(), local.to_string())),
                    other => Err(p.new_unexpected_token_error(other)),
                },
                _ => {
                    p.reset(&state);
                    Ok(NameSelector::plain(first.to_string()))
                }
            }
        }
        Token::Delim('*') => match p.next_including_whitespace()?.clone() {
            Token::Delim('|') => Ok(NameSelector {
                prefix: NamePrefix::Any,
                local: expect_local(p)?,
            }),
            other => Err(p.new_unexpected_token_error(other)),
        },
        Token::Delim('|') => Ok(NameSelector {
            prefix: NamePrefix::None,
            local: expect_local(p)?,
        }),
        other => Err(p.new_unexpected_token_error(other)),
    }
}

/// Read the rest of a block as a single quoted string, or else as raw text.
///
/// A quoted string must be the only token in the block. Returns `Ok(None)`
/// when the block is blank.
fn quoted_or_raw(p: &mut Parser<'_, '_>) -> Result<Option<String>, String> {
    if let Ok(value) = p.try_parse(|p| p.expect_string_cloned()) {
        return match p.next() {
            Err(_) => Ok(Some(value.to_string())),
            Ok(token) => Err(format!(
                "unexpected {} after quoted value",
                describe_basic(&BasicParseErrorKind::UnexpectedToken(token.clone()))
            )),
        };
    }

    let raw = consume_raw(p);
    let raw = raw.trim();
    Ok((!raw.is_empty()).then(|| raw.to_owned()))
}

/// Consume every remaining token of the block and return its source text.
fn consume_raw<'i>(p: &mut Parser<'i, '_>) -> &'i str {
    let start = p.position();
    while p.next_including_whitespace_and_comments().is_ok() {}
    p.slice_from(start)
}

fn parse_pseudo<'i>(p: &mut Parser<'i, '_>, depth: usize) -> Result<PseudoClass, CssError<'i>> {
    match p.next_including_whitespace()?.clone() {
        Token::Ident(name) => PseudoClass::from_css(&name)
            .ok_or_else(|| p.new_custom_error(SelectorErrorKind::UnknownPseudoClass(name.to_string()))),
        Token::Function(name) => parse_functional_pseudo(p, &name, depth),
        other => Err(p.new_unexpected_token_error(other)),
    }
}

fn parse_functional_pseudo<'i>(
    p: &mut Parser<'i, '_>,
    name: &str,
    depth: usize,
) -> Result<PseudoClass, CssError<'i>> {
    let pseudo = match_ignore_ascii_case! { name,
        "nth-child" => PseudoClass::NthChild(parse_nth_argument(p, "nth-child")?),
        "nth-last-child" => PseudoClass::NthLastChild(parse_nth_argument(p, "nth-last-child")?),
        "nth-of-type" => PseudoClass::NthOfType(parse_nth_argument(p, "nth-of-type")?),
        "nth-last-of-type" => PseudoClass::NthLastOfType(parse_nth_argument(p, "nth-last-of-type")?),
        "not" => PseudoClass::Not(p.parse_nested_block(|p| parse_group(p, depth + 1))?),
        "has" => PseudoClass::Has(p.parse_nested_block(|p| parse_group(p, depth + 1))?),
        "contains" => PseudoClass::Contains(parse_contains_argument(p)?),
        _ => {
            return Err(p.new_custom_error(SelectorErrorKind::UnknownPseudoClass(name.to_owned())));
        }
    };
    Ok(pseudo)
}

/// Parse an `An+B` argument.
///
/// Whitespace may pad the argument, surround a sign, or sit between the
/// coefficient and `n`. Anywhere else it splits a token and is an error.
fn parse_nth_argument<'i>(p: &mut Parser<'i, '_>, name: &str) -> Result<NthExpr, CssError<'i>> {
    let raw = p.parse_nested_block(|p| Ok::<_, CssError<'i>>(consume_raw(p)))?;

    match compact_nth(raw).and_then(|compact| parse_nth_text(&compact)) {
        Ok((a, b)) => {
            let expr = NthExpr::new(a, b);
            if expr.is_degenerate() {
                warn!(target: targets::PARSER, pseudo = name, expr = %expr, "nth expression can never match");
            }
            Ok(expr)
        }
        Err(message) => Err(p.new_custom_error(SelectorErrorKind::MalformedPseudoArgument {
            name: name.to_owned(),
            message,
        })),
    }
}

/// Drop the whitespace an `An+B` argument may legally contain.
fn compact_nth(raw: &str) -> Result<String, String> {
    let mut compact = String::with_capacity(raw.len());
    let mut chars = raw.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            compact.push(c);
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let before = compact.chars().last();
        let after = chars.peek().copied();
        let around_sign = matches!(before, Some('+' | '-')) || matches!(after, Some('+' | '-'));
        let before_n = before.is_some_and(|c| c.is_ascii_digit()) && matches!(after, Some('n' | 'N'));
        if !(around_sign || before_n) {
            return Err(format!(
                "unexpected whitespace between {:?} and {:?}",
                before.unwrap_or_default(),
                after.unwrap_or_default()
            ));
        }
    }
    Ok(compact)
}

fn parse_nth_text(text: &str) -> Result<(i32, i32), String> {
    if text.is_empty() {
        return Err("missing argument".to_string());
    }
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let nth = cssparser::parse_nth(&mut parser)
        .map_err(|e| format!("expected An+B, found {}", describe_basic(&e.kind)))?;
    parser
        .expect_exhausted()
        .map_err(|e| format!("trailing {}", describe_basic(&e.kind)))?;
    Ok(nth)
}

fn parse_contains_argument<'i>(p: &mut Parser<'i, '_>) -> Result<String, CssError<'i>> {
    let malformed = |message: String| SelectorErrorKind::MalformedPseudoArgument {
        name: "contains".to_string(),
        message,
    };
    p.parse_nested_block(|p| {
        quoted_or_raw(p)
            .map_err(|message| p.new_custom_error(malformed(message)))?
            .ok_or_else(|| p.new_custom_error(malformed("missing text".to_string())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SelectorGroup {
        parse_selector_group(text).unwrap_or_else(|e| panic!("{text:?} failed: {e}"))
    }

    fn single(text: &str) -> SelectorChain {
        let mut group = parse(text);
        assert_eq!(group.chains.len(), 1, "{text:?}");
        group.chains.remove(0)
    }

    fn parse_err(text: &str) -> ParseError {
        match parse_selector_group(text) {
            Ok(group) => panic!("{text:?} parsed as {group}"),
            Err(e) => e,
        }
    }

    #[test]
    fn parse_type_and_universal() {
        assert_eq!(parse("Q").to_string(), "Q");
        assert_eq!(parse("*").to_string(), "*");
        assert_eq!(single("*").parts[0].simple_selectors, vec![SimpleSelector::Universal]);
    }

    #[test]
    fn parse_class_and_id() {
        let chain = single("Q.a.b#x");
        assert_eq!(
            chain.parts[0].simple_selectors,
            vec![
                SimpleSelector::Type(NameSelector::plain("Q")),
                SimpleSelector::Class("a".into()),
                SimpleSelector::Class("b".into()),
                SimpleSelector::Id("x".into()),
            ]
        );
    }

    #[test]
    fn parse_escaped_identifiers() {
        let chain = single(r"#id\.with\.dot");
        assert_eq!(chain.parts[0].simple_selectors, vec![SimpleSelector::Id("id.with.dot".into())]);

        let chain = single(r"E\-E");
        assert_eq!(
            chain.parts[0].simple_selectors,
            vec![SimpleSelector::Type(NameSelector::plain("E-E"))]
        );
    }

    #[test]
    fn parse_combinators() {
        let chain = single("A B > C + D ~ E < F");
        assert_eq!(chain.parts.len(), 6);
        assert_eq!(
            chain.combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::AdjacentSibling,
                Combinator::GeneralSibling,
                Combinator::PreviousSibling,
            ]
        );
        assert_eq!(chain.leading, None);

        let tight = single("A>B+C~D<E");
        assert_eq!(tight.combinators[1..], chain.combinators[2..]);
        assert_eq!(tight.combinators[0], Combinator::Child);
    }

    #[test]
    fn parse_relative_selectors() {
        assert_eq!(single("> Q").leading, Some(Combinator::Child));
        assert_eq!(single("+S").leading, Some(Combinator::AdjacentSibling));
        assert_eq!(single(" ~ S T").leading, Some(Combinator::GeneralSibling));
        assert_eq!(single("> Q").to_string(), "> Q");
    }

    #[test]
    fn parse_groups_and_whitespace() {
        let group = parse(" Q ,\tR > S ,  T ");
        assert_eq!(group.to_string(), "Q, R > S, T");
    }

    #[test]
    fn parse_namespaced_types() {
        let chain = single("p|Q");
        assert_eq!(
            chain.parts[0].simple_selectors,
            vec![SimpleSelector::Type(NameSelector::prefixed("p", "Q"))]
        );
        assert_eq!(single("*|Q").to_string(), "*|Q");
        assert_eq!(single("|Q").to_string(), "|Q");
        assert_eq!(single("p|*").to_string(), "p|*");
    }

    #[test]
    fn parse_attribute_operators() {
        let cases = [
            ("[A]", AttrOperator::Exists),
            ("[A=v]", AttrOperator::Equals("v".into())),
            ("[A~='v']", AttrOperator::ContainsWord("v".into())),
            ("[A|=\"en\"]", AttrOperator::StartsWithPrefix("en".into())),
            ("[A^=http://]", AttrOperator::StartsWith("http://".into())),
            ("[A$=.gif]", AttrOperator::EndsWith(".gif".into())),
            ("[ A *= 'pter 2' ]", AttrOperator::Substring("pter 2".into())),
            ("[A='']", AttrOperator::Equals(String::new())),
        ];
        for (text, expected) in cases {
            let chain = single(text);
            match &chain.parts[0].simple_selectors[..] {
                [SimpleSelector::Attribute(attr)] => {
                    assert_eq!(attr.name, NameSelector::plain("A"), "{text}");
                    assert_eq!(attr.operator, expected, "{text}");
                }
                other => panic!("{text}: {other:?}"),
            }
        }
    }

    #[test]
    fn parse_attribute_names() {
        let name_of = |text: &str| match &single(text).parts[0].simple_selectors[..] {
            [SimpleSelector::Attribute(attr)] => attr.name.clone(),
            other => panic!("{text}: {other:?}"),
        };
        assert_eq!(name_of("[p|A]"), NameSelector::prefixed("p", "A"));
        assert_eq!(name_of("[p:A]"), NameSelector::prefixed("p", "A"));
        assert_eq!(name_of("[*|A]").prefix, NamePrefix::Any);
        assert_eq!(name_of("[|A]").prefix, NamePrefix::None);
        assert_eq!(name_of("[A|=x]"), NameSelector::plain("A"));
    }

    #[test]
    fn parse_nth_arguments() {
        let nth_of = |text: &str| match &single(text).parts[0].simple_selectors[..] {
            [SimpleSelector::Pseudo(pseudo)] => pseudo.nth_expr().unwrap(),
            other => panic!("{text}: {other:?}"),
        };
        assert_eq!(nth_of(":nth-child(3)"), NthExpr::new(0, 3));
        assert_eq!(nth_of(":nth-child(odd)"), NthExpr::odd());
        assert_eq!(nth_of(":nth-child(even)"), NthExpr::even());
        assert_eq!(nth_of(":nth-child( 2n + 1 )"), NthExpr::new(2, 1));
        assert_eq!(nth_of(":nth-last-child(-n+3)"), NthExpr::new(-1, 3));
        assert_eq!(nth_of(":nth-of-type(n - 4)"), NthExpr::new(1, -4));
        assert_eq!(nth_of(":NTH-LAST-OF-TYPE(3n-1)"), NthExpr::new(3, -1));
        assert_eq!(nth_of(":nth-child(-n)"), NthExpr::new(-1, 0));
        assert_eq!(nth_of(":nth-child(2 n)"), NthExpr::new(2, 0));
        assert_eq!(nth_of(":nth-child(+ 2n)"), NthExpr::new(2, 0));
        assert_eq!(nth_of(":nth-child(- n + 3)"), NthExpr::new(-1, 3));
        assert_eq!(nth_of(":nth-child(12)"), NthExpr::new(0, 12));
    }

    #[test]
    fn quoted_values_end_the_block() {
        let contains_of = |text: &str| match &single(text).parts[0].simple_selectors[..] {
            [SimpleSelector::Pseudo(PseudoClass::Contains(text))] => text.clone(),
            other => panic!("{text}: {other:?}"),
        };
        assert_eq!(contains_of(":contains( 'x y' )"), "x y");
        assert_eq!(contains_of(":contains(x 'y')"), "x 'y'");
        assert!(parse_selector_group("[A = 'v' ]").is_ok());
    }

    #[test]
    fn parse_functional_pseudo_classes() {
        let chain = single("Q:not(R, .a):has(> S)");
        match &chain.parts[0].simple_selectors[..] {
            [_, SimpleSelector::Pseudo(PseudoClass::Not(not)), SimpleSelector::Pseudo(PseudoClass::Has(has))] => {
                assert_eq!(not.chains.len(), 2);
                assert_eq!(has.chains[0].leading, Some(Combinator::Child));
            }
            other => panic!("{other:?}"),
        }

        let contains = |text: &str| match &single(text).parts[0].simple_selectors[..] {
            [SimpleSelector::Pseudo(PseudoClass::Contains(s))] => s.clone(),
            other => panic!("{text}: {other:?}"),
        };
        assert_eq!(contains(":contains('a b')"), "a b");
        assert_eq!(contains(":contains( \"x\" )"), "x");
        assert_eq!(contains(":contains(plain text)"), "plain text");
        assert_eq!(contains(":contains('')"), "");
    }

    #[test]
    fn parse_structural_pseudo_classes() {
        let chain = single("Q:first-child:last-of-type:only-child:empty:root");
        assert_eq!(chain.parts[0].simple_selectors.len(), 6);
        assert_eq!(chain.to_string(), "Q:first-child:last-of-type:only-child:empty:root");
    }

    #[test]
    fn quoted_line_breaks_are_escaped() {
        let chain = single("[A='a\nb']");
        match &chain.parts[0].simple_selectors[..] {
            [SimpleSelector::Attribute(attr)] => {
                assert_eq!(attr.operator, AttrOperator::Equals("a\nb".into()));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn empty_selector_errors() {
        assert_eq!(parse_err(""), ParseError::EmptySelector);
        assert_eq!(parse_err("   "), ParseError::EmptySelector);
        assert_eq!(parse_err("Q,"), ParseError::EmptySelector);
        assert_eq!(parse_err(", Q"), ParseError::EmptySelector);
        assert_eq!(parse_err("Q:not()"), ParseError::EmptySelector);
    }

    #[test]
    fn unbalanced_bracket_errors() {
        assert_eq!(
            parse_err("Q[A"),
            ParseError::UnbalancedBracket { bracket: '[', column: 2 }
        );
        assert_eq!(
            parse_err("Q)"),
            ParseError::UnbalancedBracket { bracket: ')', column: 2 }
        );
        assert_eq!(
            parse_err("Q:not(R]"),
            ParseError::UnbalancedBracket { bracket: ']', column: 8 }
        );
        // brackets inside quotes and escapes are ignored
        assert!(parse_selector_group("[A='[(']").is_ok());
        assert!(parse_selector_group(r"#a\(").is_ok());
    }

    #[test]
    fn malformed_attribute_errors() {
        for text in ["[A=]", "[=v]", "[A B]", "[A!=v]", "[]", "[A='v' w]", "[A='v''w']"] {
            assert!(
                matches!(parse_err(text), ParseError::MalformedAttribute { .. }),
                "{text}"
            );
        }
    }

    #[test]
    fn malformed_pseudo_argument_errors() {
        for text in [
            ":nth-child(x)",
            ":nth-child()",
            ":nth-of-type(2n+)",
            ":nth-child(1 2)",
            ":nth-child(o dd)",
            ":nth-child(ev en)",
            ":nth-child(2n 1)",
            ":contains()",
            ":contains('x' 'y')",
            ":contains('x'y)",
        ] {
            assert!(
                matches!(parse_err(text), ParseError::MalformedPseudoArgument { .. }),
                "{text}"
            );
        }
    }

    #[test]
    fn unknown_pseudo_class_errors() {
        match parse_err("Q:hover") {
            ParseError::UnknownPseudoClass { name, line, .. } => {
                assert_eq!(name, "hover");
                assert_eq!(line, 1);
            }
            other => panic!("{other:?}"),
        }
        assert!(matches!(parse_err(":matches(Q)"), ParseError::UnknownPseudoClass { .. }));
    }

    #[test]
    fn unexpected_token_errors() {
        match parse_err("Q >") {
            ParseError::UnexpectedToken { token, .. } => assert_eq!(token, "end of input"),
            other => panic!("{other:?}"),
        }
        match parse_err("Q $") {
            ParseError::UnexpectedToken { token, .. } => assert_eq!(token, "'$'"),
            other => panic!("{other:?}"),
        }
        for text in ["Q::before", "Q > > R", "[A]Q", "Q.", "Q!"] {
            assert!(
                matches!(parse_err(text), ParseError::UnexpectedToken { .. }),
                "{text}"
            );
        }
    }

    #[test]
    fn nesting_depth_is_limited() {
        let nested = |depth: usize| format!("{}Q{}", "Q:not(".repeat(depth), ")".repeat(depth));
        assert!(parse_selector_group(&nested(MAX_NESTING_DEPTH)).is_ok());
        assert_eq!(
            parse_err(&nested(MAX_NESTING_DEPTH + 1)),
            ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH }
        );
    }
}
