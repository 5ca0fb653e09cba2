//! Tag-tree reader.
//!
//! Turns markup text into a [`Node`] tree: tagged nodes with string
//! attributes and nested children. This is deliberately small: no entities,
//! no processing instructions, and free text content between tags carries no
//! semantics and is dropped. Attribute names are case-insensitive and stored
//! lowercased; duplicate attributes keep the last value.

use logos::{Lexer, Logos};
use smol_str::SmolStr;

use super::lexer::{TagToken, TextToken};
use crate::base::{AttrMap, AttrValue};
use crate::error::{DefError, Result};

/// A parsed markup element.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// The qualified tag name, e.g. `quill:application`.
    pub tag: SmolStr,
    /// Attributes with lowercased keys.
    pub attributes: AttrMap,
    /// Child elements in declaration order.
    pub children: Vec<Node>,
}

impl Node {
    /// Case-insensitive attribute lookup.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name.to_ascii_lowercase().as_str())
    }
}

/// Parse a markup source into its single root element.
pub fn parse_markup(text: &str) -> Result<Node> {
    tracing::trace!(len = text.len(), "parsing markup source");
    let mut lex = TextToken::lexer(text);
    let mut root: Option<Node> = None;

    while let Some(tok) = lex.next() {
        match tok {
            Ok(TextToken::Text(t)) if t.trim().is_empty() => {}
            Ok(TextToken::TagStart) => {
                if root.is_some() {
                    return Err(DefError::invalid("multiple root tags in markup"));
                }
                let (node, rest) = parse_element(lex)?;
                lex = rest;
                root = Some(node);
            }
            _ => return Err(malformed(lex.span().start)),
        }
    }

    root.ok_or_else(|| DefError::invalid("empty markup source"))
}

/// Parse one element. The lexer is positioned just past the opening `<`.
///
/// Returns the node and the text-mode lexer positioned past the element.
fn parse_element<'a>(lex: Lexer<'a, TextToken<'a>>) -> Result<(Node, Lexer<'a, TextToken<'a>>)> {
    let mut tl = lex.morph::<TagToken>();

    let tag = match tl.next() {
        Some(Ok(TagToken::Name(name))) => name,
        _ => return Err(malformed(tl.span().start)),
    };

    let mut attributes = AttrMap::new();
    let mut tok = tl.next();
    loop {
        match tok {
            Some(Ok(TagToken::Name(key))) => {
                let key = SmolStr::new(key.to_ascii_lowercase());
                tok = tl.next();
                if matches!(tok, Some(Ok(TagToken::Eq))) {
                    match tl.next() {
                        Some(Ok(TagToken::Str(value))) => {
                            attributes.insert(key, AttrValue::from(value));
                        }
                        _ => return Err(malformed(tl.span().start)),
                    }
                    tok = tl.next();
                } else {
                    // Bare attribute: same meaning as attr=''.
                    attributes.insert(key, AttrValue::Empty);
                }
            }
            Some(Ok(TagToken::SelfClose)) => {
                let node = Node {
                    tag: SmolStr::new(tag),
                    attributes,
                    children: Vec::new(),
                };
                return Ok((node, tl.morph()));
            }
            Some(Ok(TagToken::TagEnd)) => break,
            _ => return Err(malformed(tl.span().start)),
        }
    }

    // Open element: read children until the matching close tag.
    let mut lex = tl.morph::<TextToken>();
    let mut children = Vec::new();
    loop {
        match lex.next() {
            Some(Ok(TextToken::Text(_))) => {}
            Some(Ok(TextToken::TagStart)) => {
                let (child, rest) = parse_element(lex)?;
                lex = rest;
                children.push(child);
            }
            Some(Ok(TextToken::CloseTagStart)) => {
                let close = expect_close_tag(lex, tag)?;
                let node = Node {
                    tag: SmolStr::new(tag),
                    attributes,
                    children,
                };
                return Ok((node, close.morph()));
            }
            _ => {
                return Err(DefError::invalid(format!("unterminated <{tag}> element")));
            }
        }
    }
}

/// Consume `name >` after a `</`, checking the name matches the open tag.
fn expect_close_tag<'a>(
    lex: Lexer<'a, TextToken<'a>>,
    tag: &str,
) -> Result<Lexer<'a, TagToken<'a>>> {
    let mut close = lex.morph::<TagToken>();
    match close.next() {
        Some(Ok(TagToken::Name(name))) if name == tag => {}
        Some(Ok(TagToken::Name(name))) => {
            return Err(DefError::invalid(format!(
                "mismatched closing tag </{name}>, expected </{tag}>"
            )));
        }
        _ => return Err(malformed(close.span().start)),
    }
    match close.next() {
        Some(Ok(TagToken::TagEnd)) => Ok(close),
        _ => Err(malformed(close.span().start)),
    }
}

fn malformed(offset: usize) -> DefError {
    DefError::invalid(format!("malformed markup at offset {offset}"))
}
