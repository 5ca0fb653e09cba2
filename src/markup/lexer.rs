//! Token definitions for tag markup.
//!
//! Lexing runs in two modes, switched via [`logos::Lexer::morph`]: outside
//! tags only `<`, `</`, comments, and raw text are significant; inside a tag
//! the stream is names, `=`, quoted strings, and the two tag terminators.

use logos::{Lexer, Logos, Skip};

/// Tokens between tags.
#[derive(Logos, Clone, Debug, PartialEq)]
pub enum TextToken<'a> {
    #[token("</")]
    CloseTagStart,

    #[token("<!--", skip_comment)]
    Comment,

    #[token("<")]
    TagStart,

    /// Raw text content up to the next tag.
    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'a str),
}

/// Tokens inside a tag, between `<` and `>` or `/>`.
#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken<'a> {
    #[token("/>")]
    SelfClose,

    #[token(">")]
    TagEnd,

    #[token("=")]
    Eq,

    /// A tag or attribute name, optionally `ns:name` qualified.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*(:[A-Za-z_][A-Za-z0-9_.\-]*)?", |lex| lex.slice())]
    Name(&'a str),

    /// A quoted attribute value, quotes stripped.
    #[regex(r#""[^"]*""#, unquote)]
    #[regex(r"'[^']*'", unquote)]
    Str(&'a str),
}

fn unquote<'a>(lex: &mut Lexer<'a, TagToken<'a>>) -> &'a str {
    let s = lex.slice();
    &s[1..s.len() - 1]
}

fn skip_comment<'a>(lex: &mut Lexer<'a, TextToken<'a>>) -> Skip {
    match lex.remainder().find("-->") {
        Some(end) => lex.bump(end + 3),
        None => {
            let rest = lex.remainder().len();
            lex.bump(rest);
        }
    }
    Skip
}
