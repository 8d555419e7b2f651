//! Syntax tree for HCL configuration files.
//!
//! The tree has five shapes:
//!
//! | Shape | Type | Contents |
//! |-------|------|----------|
//! | root | [`Body`] | ordered list of items |
//! | item | [`Item`] | ordered keys plus one value |
//! | key | [`Key`] | a single token |
//! | value | [`Value`] | a scalar token, a nested body (map) or a list |
//! | token | [`Token`] | raw source text with its range |
//!
//! Every node carries a [`Range`] and parent ranges always contain the ranges
//! of their children. The rest of the crate only depends on these shapes; the
//! concrete parser sits behind the [`SyntaxParser`] trait.

mod interpolation;
mod lexer;
mod parser;
mod value;
mod walk;

pub use interpolation::{scan_interpolations, Accessor, ExprRef};
pub use parser::{HclParser, SyntaxParser};
pub use value::{find_attribute, render, render_item, token_text, FAILED_VALUE};
pub use walk::{dump, walk, NodeKind, NodeRef, Visit};

use serde::{Deserialize, Serialize};

use crate::types::{Pos, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Ident,
    Number,
    Float,
    Bool,
    /// A double-quoted string; the text includes the quotes.
    String,
    /// A `<<EOF` heredoc; the text includes the header and closing anchor.
    Heredoc,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    Assign,
    Comma,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number | TokenKind::Float => "number",
            TokenKind::Bool => "boolean",
            TokenKind::String => "string",
            TokenKind::Heredoc => "heredoc",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBrack => "'['",
            TokenKind::RBrack => "']'",
            TokenKind::Assign => "'='",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub range: Range,
}

impl Token {
    /// The token text with surrounding quotes removed for strings.
    pub fn unquoted(&self) -> &str {
        match self.kind {
            TokenKind::String if self.text.len() >= 2 => &self.text[1..self.text.len() - 1],
            _ => &self.text,
        }
    }

    /// The range of [`Token::unquoted`].
    pub fn unquoted_range(&self) -> Range {
        match self.kind {
            TokenKind::String if self.text.len() >= 2 => {
                let end = self.range.end;
                Range::new(
                    self.range.start.advance(1, 1),
                    Pos::new(end.line, end.column - 1, end.offset - 1),
                )
            }
            _ => self.range,
        }
    }
}

/// An ordered list of items; the root of a file and the inside of every map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Body {
    pub items: Vec<Item>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub keys: Vec<Key>,
    pub value: Option<Value>,
    pub range: Range,
}

impl Item {
    /// Text of the first key, unquoted.
    pub fn first_key(&self) -> Option<&str> {
        self.keys.first().map(|key| key.token.unquoted())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Scalar(Token),
    Map(Map),
    List(List),
}

impl Value {
    pub fn range(&self) -> Range {
        match self {
            Value::Scalar(token) => token.range,
            Value::Map(map) => map.range,
            Value::List(list) => list.range,
        }
    }

    pub fn as_map(&self) -> Option<&Body> {
        match self {
            Value::Map(map) => Some(&map.body),
            _ => None,
        }
    }
}

/// A `{ ... }` value; the range spans both braces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Map {
    pub body: Body,
    pub range: Range,
}

/// A `[ ... ]` value; the range spans both brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct List {
    pub entries: Vec<Value>,
    pub range: Range,
}

/// A syntax error in one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display("{}:{}: {}", range.start.line, range.start.column, message)]
pub struct ParseError {
    pub message: String,
    pub range: Range,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: Range) -> ParseError {
        ParseError {
            message: message.into(),
            range,
        }
    }
}
