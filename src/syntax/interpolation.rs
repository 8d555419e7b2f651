//! Scanner for `${ ... }` interpolations inside string and heredoc tokens.
//!
//! This is not a full expression parser. It recovers identifier chains
//! (`var.region`, `aws_instance.web.*.id`, `var.list[0]`) and their source
//! ranges, descending into nested strings, function arguments and bracket
//! contents. Deciding which chains are references is left to the index.

use super::lexer::{is_ident_start, Cursor};
use super::{ParseError, Token, TokenKind};
use crate::types::{Pos, Range};

/// One step after the root of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// `.name`
    Name(String),
    /// `[...]`, kept verbatim with its brackets
    Index(String),
    /// `.*` or `[*]`
    Splat,
}

impl Accessor {
    /// The accessor as a value path segment.
    pub fn segment(&self) -> String {
        match self {
            Accessor::Name(name) => name.clone(),
            Accessor::Index(text) => text.clone(),
            Accessor::Splat => "*".to_string(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Accessor::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// An identifier chain found inside an interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprRef {
    pub root: String,
    pub root_range: Range,
    pub accessors: Vec<(Accessor, Range)>,
}

impl ExprRef {
    /// Range from the root through the first `n` accessors.
    pub fn span(&self, n: usize) -> Range {
        let end = match n.min(self.accessors.len()) {
            0 => self.root_range.end,
            n => self.accessors[n - 1].1.end,
        };
        Range::new(self.root_range.start, end)
    }
}

/// Every identifier chain in the interpolations of `token`, in source order.
/// Tokens other than strings and heredocs have none.
pub fn scan_interpolations(token: &Token) -> Result<Vec<ExprRef>, ParseError> {
    if !matches!(token.kind, TokenKind::String | TokenKind::Heredoc) {
        return Ok(Vec::new());
    }

    let mut cursor = Cursor::starting_at(&token.text, token.range.start);
    let mut refs = Vec::new();
    if token.kind == TokenKind::String {
        cursor.bump();
    }
    scan_template(&mut cursor, None, &mut refs)?;
    Ok(refs)
}

/// Literal template text. Stops after `quote` when given, otherwise at the end
/// of input.
fn scan_template(
    cursor: &mut Cursor,
    quote: Option<Pos>,
    refs: &mut Vec<ExprRef>,
) -> Result<(), ParseError> {
    loop {
        match cursor.peek() {
            None => {
                return match quote {
                    Some(start) => Err(ParseError::new(
                        "string not terminated in interpolation",
                        Range::new(start, cursor.pos()),
                    )),
                    None => Ok(()),
                }
            }
            Some('\\') => {
                cursor.bump();
                cursor.bump();
            }
            Some('"') if quote.is_some() => {
                cursor.bump();
                return Ok(());
            }
            Some('$') if cursor.starts_with("$${") => {
                cursor.bump();
                cursor.bump();
                cursor.bump();
            }
            Some('$') if cursor.starts_with("${") => {
                let start = cursor.pos();
                cursor.bump();
                cursor.bump();
                scan_expr(cursor, '}', start, refs)?;
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

/// Expression text up to and including the matching `close`.
fn scan_expr(
    cursor: &mut Cursor,
    close: char,
    open: Pos,
    refs: &mut Vec<ExprRef>,
) -> Result<(), ParseError> {
    let mut depth = 0usize;

    loop {
        let Some(ch) = cursor.peek() else {
            return Err(ParseError::new(
                "interpolation not terminated",
                Range::new(open, cursor.pos()),
            ));
        };

        match ch {
            c if c == close && depth == 0 => {
                cursor.bump();
                return Ok(());
            }
            '{' | '[' | '(' => {
                depth += 1;
                cursor.bump();
            }
            '}' | ']' | ')' => {
                depth = depth.saturating_sub(1);
                cursor.bump();
            }
            '"' => {
                let start = cursor.pos();
                cursor.bump();
                scan_template(cursor, Some(start), refs)?;
            }
            c if c.is_ascii_digit() => {
                cursor.bump_while(|c| c.is_ascii_alphanumeric() || c == '.');
            }
            c if is_ident_start(c) => scan_chain(cursor, refs)?,
            _ => {
                cursor.bump();
            }
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn scan_name(cursor: &mut Cursor) -> (String, Range) {
    let start = cursor.pos();
    cursor.bump_while(is_name_char);
    (
        cursor.text_since(start).to_string(),
        Range::new(start, cursor.pos()),
    )
}

fn scan_chain(cursor: &mut Cursor, refs: &mut Vec<ExprRef>) -> Result<(), ParseError> {
    let (root, root_range) = scan_name(cursor);

    // function call: the arguments are scanned by the caller
    if cursor.peek() == Some('(') {
        return Ok(());
    }

    let slot = refs.len();
    let mut accessors = Vec::new();

    loop {
        match (cursor.peek(), cursor.peek_nth(1)) {
            (Some('.'), Some('*')) => {
                let start = cursor.pos();
                cursor.bump();
                cursor.bump();
                accessors.push((Accessor::Splat, Range::new(start, cursor.pos())));
            }
            (Some('.'), Some(c)) if is_name_char(c) => {
                cursor.bump();
                let (name, range) = scan_name(cursor);
                accessors.push((Accessor::Name(name), range));
            }
            (Some('['), _) => {
                let start = cursor.pos();
                cursor.bump();
                scan_expr(cursor, ']', start, refs)?;
                let text = cursor.text_since(start);
                let accessor = if text.trim_start_matches('[').trim_end_matches(']').trim() == "*" {
                    Accessor::Splat
                } else {
                    Accessor::Index(text.to_string())
                };
                accessors.push((accessor, Range::new(start, cursor.pos())));
            }
            _ => break,
        }
    }

    refs.insert(
        slot,
        ExprRef {
            root,
            root_range,
            accessors,
        },
    );
    Ok(())
}
