//! Tokenizer for HCL source text.
//!
//! Produces the flat token stream consumed by the parser. Comments (`#`, `//`,
//! `/* */`) and whitespace are skipped. Strings keep their quotes and any
//! `${...}` interpolations verbatim; interpolations are only balanced here,
//! their contents are scanned later by the reference extractor.

use super::{ParseError, Token, TokenKind};
use crate::types::{Pos, Range};

/// A character cursor that tracks line, column and byte offset.
#[derive(Debug, Clone)]
pub(super) struct Cursor<'a> {
    src: &'a str,
    pos: Pos,
    base: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(src: &'a str) -> Cursor<'a> {
        Cursor::starting_at(src, Pos::new(1, 1, 0))
    }

    /// A cursor over `src` whose first character sits at `start` in the file.
    pub(super) fn starting_at(src: &'a str, start: Pos) -> Cursor<'a> {
        Cursor {
            src,
            pos: start,
            base: start.offset,
        }
    }

    pub(super) fn pos(&self) -> Pos {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos.offset - self.base..]
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(super) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub(super) fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    pub(super) fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    pub(super) fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    pub(super) fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    /// Source text between `start` and the current position.
    pub(super) fn text_since(&self, start: Pos) -> &'a str {
        &self.src[start.offset - self.base..self.pos.offset - self.base]
    }
}

pub(super) fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

pub(super) fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
}

pub(super) fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut cursor = Cursor::new(src);
    let mut tokens = Vec::new();

    loop {
        skip_trivia(&mut cursor)?;
        let start = cursor.pos();

        let Some(ch) = cursor.peek() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                range: Range::new(start, start),
            });
            return Ok(tokens);
        };

        let kind = match ch {
            '{' => single(&mut cursor, TokenKind::LBrace),
            '}' => single(&mut cursor, TokenKind::RBrace),
            '[' => single(&mut cursor, TokenKind::LBrack),
            ']' => single(&mut cursor, TokenKind::RBrack),
            '=' => single(&mut cursor, TokenKind::Assign),
            ',' => single(&mut cursor, TokenKind::Comma),
            '"' => {
                scan_string(&mut cursor)?;
                TokenKind::String
            }
            '<' if cursor.starts_with("<<") => {
                scan_heredoc(&mut cursor)?;
                TokenKind::Heredoc
            }
            '-' if cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                cursor.bump();
                scan_number(&mut cursor)
            }
            c if c.is_ascii_digit() => scan_number(&mut cursor),
            c if is_ident_start(c) => {
                cursor.bump_while(is_ident_char);
                match cursor.text_since(start) {
                    "true" | "false" => TokenKind::Bool,
                    _ => TokenKind::Ident,
                }
            }
            other => {
                cursor.bump();
                return Err(ParseError::new(
                    format!("illegal character '{other}'"),
                    Range::new(start, cursor.pos()),
                ));
            }
        };

        tokens.push(Token {
            kind,
            text: cursor.text_since(start).to_string(),
            range: Range::new(start, cursor.pos()),
        });
    }
}

fn single(cursor: &mut Cursor, kind: TokenKind) -> TokenKind {
    cursor.bump();
    kind
}

fn skip_trivia(cursor: &mut Cursor) -> Result<(), ParseError> {
    loop {
        match cursor.peek() {
            Some(c) if c.is_whitespace() => {
                cursor.bump();
            }
            Some('#') => cursor.bump_while(|c| c != '\n'),
            Some('/') if cursor.starts_with("//") => cursor.bump_while(|c| c != '\n'),
            Some('/') if cursor.starts_with("/*") => {
                let start = cursor.pos();
                cursor.bump();
                cursor.bump();
                loop {
                    if cursor.starts_with("*/") {
                        cursor.bump();
                        cursor.bump();
                        break;
                    }
                    if cursor.bump().is_none() {
                        return Err(ParseError::new(
                            "comment not terminated",
                            Range::new(start, cursor.pos()),
                        ));
                    }
                }
            }
            _ => return Ok(()),
        }
    }
}

fn scan_number(cursor: &mut Cursor) -> TokenKind {
    cursor.bump_while(|c| c.is_ascii_digit());
    let mut kind = TokenKind::Number;
    if cursor.peek() == Some('.') && cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
        cursor.bump();
        cursor.bump_while(|c| c.is_ascii_digit());
        kind = TokenKind::Float;
    }
    if matches!(cursor.peek(), Some('e' | 'E')) {
        cursor.bump();
        if matches!(cursor.peek(), Some('+' | '-')) {
            cursor.bump();
        }
        cursor.bump_while(|c| c.is_ascii_digit());
        kind = TokenKind::Float;
    }
    kind
}

/// Scans a quoted string starting at the opening quote, balancing any
/// interpolations (which may themselves contain quoted strings).
pub(super) fn scan_string(cursor: &mut Cursor) -> Result<(), ParseError> {
    let start = cursor.pos();
    cursor.bump();

    loop {
        match cursor.peek() {
            None | Some('\n') => {
                return Err(ParseError::new(
                    "literal not terminated",
                    Range::new(start, cursor.pos()),
                ))
            }
            Some('\\') => {
                cursor.bump();
                if cursor.peek().is_some_and(|c| c != '\n') {
                    cursor.bump();
                }
            }
            Some('"') => {
                cursor.bump();
                return Ok(());
            }
            Some('$') if cursor.starts_with("$${") => {
                cursor.bump();
                cursor.bump();
                cursor.bump();
            }
            Some('$') if cursor.starts_with("${") => {
                scan_interpolation(cursor)?;
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

fn scan_interpolation(cursor: &mut Cursor) -> Result<(), ParseError> {
    let start = cursor.pos();
    cursor.bump();
    cursor.bump();
    let mut depth = 1;

    while depth > 0 {
        match cursor.peek() {
            None | Some('\n') => {
                return Err(ParseError::new(
                    "interpolation not terminated",
                    Range::new(start, cursor.pos()),
                ))
            }
            Some('{') => {
                depth += 1;
                cursor.bump();
            }
            Some('}') => {
                depth -= 1;
                cursor.bump();
            }
            Some('"') => scan_string(cursor)?,
            Some(_) => {
                cursor.bump();
            }
        }
    }
    Ok(())
}

fn scan_heredoc(cursor: &mut Cursor) -> Result<(), ParseError> {
    let start = cursor.pos();
    cursor.bump();
    cursor.bump();
    let indented = cursor.peek() == Some('-');
    if indented {
        cursor.bump();
    }

    let anchor_start = cursor.pos();
    cursor.bump_while(|c| c.is_alphanumeric() || c == '_');
    let anchor = cursor.text_since(anchor_start).to_string();
    if cursor.peek() == Some('\r') {
        cursor.bump();
    }
    if anchor.is_empty() || cursor.peek() != Some('\n') {
        return Err(ParseError::new(
            "heredoc expected an anchor followed by a newline",
            Range::new(start, cursor.pos()),
        ));
    }
    cursor.bump();

    loop {
        if cursor.is_eof() {
            return Err(ParseError::new(
                format!("heredoc not terminated, expected '{anchor}'"),
                Range::new(start, cursor.pos()),
            ));
        }
        let line_start = cursor.pos();
        cursor.bump_while(|c| c != '\n');
        let line = cursor.text_since(line_start);
        let candidate = if indented { line.trim() } else { line.trim_end() };
        if candidate == anchor {
            return Ok(());
        }
        cursor.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_block_header() {
        assert_eq!(
            kinds(r#"resource "aws_s3_bucket" "bucket" {}"#),
            vec![
                TokenKind::Ident,
                TokenKind::String,
                TokenKind::String,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("a = 1\n  b = \"x\"").unwrap();

        let b = &tokens[3];
        assert_eq!(b.text, "b");
        assert_eq!((b.range.start.line, b.range.start.column), (2, 3));
        assert_eq!(b.range.start.offset, 8);

        let x = &tokens[5];
        assert_eq!(x.text, "\"x\"");
        assert_eq!((x.range.end.line, x.range.end.column), (2, 10));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("# one\n// two\n/* three\n */ a = true"),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Bool,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_with_nested_quotes_in_interpolation() {
        let tokens = tokenize(r#"a = "${lookup(var.m, "k")}-x""#).unwrap();

        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, r#""${lookup(var.m, "k")}-x""#);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("a = -12\nb = 1.5e3"),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Float,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_heredoc() {
        let src = "a = <<EOF\nline one\n  line two\nEOF\nb = 1";
        let tokens = tokenize(src).unwrap();

        assert_eq!(tokens[2].kind, TokenKind::Heredoc);
        assert_eq!(tokens[2].text, "<<EOF\nline one\n  line two\nEOF");
        assert_eq!(tokens[3].text, "b");
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = tokenize("a = \"abc\nb = 1").unwrap_err();

        assert_eq!(err.message, "literal not terminated");
        assert_eq!(err.range.start.line, 1);
    }

    #[test]
    fn test_multibyte_columns_count_characters() {
        let tokens = tokenize("a = \"é\" b").unwrap();

        assert_eq!(tokens[3].range.start.column, 9);
        assert_eq!(tokens[3].range.start.offset, 9);
    }
}
