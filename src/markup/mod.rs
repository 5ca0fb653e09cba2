//! Markup front end: logos-based lexer and tag-tree reader.

mod lexer;
mod parser;

pub use parser::{parse_markup, Node};
