use super::lexer::tokenize;
use super::{Body, Item, Key, List, Map, ParseError, Token, TokenKind, Value};
use crate::types::{Pos, Range};

/// Turns source text into a syntax tree.
///
/// The index only depends on the tree shapes, so alternative parsers can be
/// plugged into the coordinator through this trait.
pub trait SyntaxParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<Body, ParseError>;
}

/// Recursive-descent parser for HCL.
#[derive(Debug, Default, Clone, Copy)]
pub struct HclParser;

impl SyntaxParser for HclParser {
    fn parse(&self, text: &str) -> Result<Body, ParseError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser { tokens, index: 0 };
        let items = parser.parse_items(false)?;
        let end = parser.peek().range.end;

        Ok(Body {
            items,
            range: Range::new(Pos::new(1, 1, 0), end),
        })
    }
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // the token stream always ends with Eof
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::new(
            format!("expected {expected}, found {}", token.kind.describe()),
            token.range,
        )
    }

    /// Items until end of file (top level) or until the closing brace (nested).
    /// The closing brace itself is left for the caller.
    fn parse_items(&mut self, nested: bool) -> Result<Vec<Item>, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof if nested => return Err(self.unexpected("'}'")),
                TokenKind::Eof => return Ok(items),
                TokenKind::RBrace if nested => return Ok(items),
                TokenKind::Ident | TokenKind::String => items.push(self.parse_item()?),
                _ => return Err(self.unexpected("a key")),
            }
        }
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        let mut keys = Vec::new();
        while matches!(self.peek().kind, TokenKind::Ident | TokenKind::String) {
            keys.push(Key { token: self.next() });
        }

        let value = match self.peek().kind {
            TokenKind::Assign if keys.len() == 1 => {
                self.next();
                self.parse_value()?
            }
            TokenKind::Assign => return Err(self.unexpected("'{' after block labels")),
            TokenKind::LBrace => self.parse_map()?,
            _ => return Err(self.unexpected("'=' or '{'")),
        };

        if self.peek().kind == TokenKind::Comma {
            self.next();
        }

        // keys is never empty: parse_items only calls us on a key token
        let start = keys[0].token.range.start;
        let range = Range::new(start, value.range().end);
        Ok(Item {
            keys,
            value: Some(value),
            range,
        })
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek().kind {
            TokenKind::String
            | TokenKind::Heredoc
            | TokenKind::Number
            | TokenKind::Float
            | TokenKind::Bool
            | TokenKind::Ident => Ok(Value::Scalar(self.next())),
            TokenKind::LBrace => self.parse_map(),
            TokenKind::LBrack => self.parse_list(),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_map(&mut self) -> Result<Value, ParseError> {
        let open = self.next();
        let items = self.parse_items(true)?;
        let close = self.next();
        let range = Range::new(open.range.start, close.range.end);

        Ok(Value::Map(Map {
            body: Body { items, range },
            range,
        }))
    }

    fn parse_list(&mut self) -> Result<Value, ParseError> {
        let open = self.next();
        let mut entries = Vec::new();

        loop {
            if self.peek().kind == TokenKind::RBrack {
                break;
            }
            entries.push(self.parse_value()?);
            match self.peek().kind {
                TokenKind::Comma => {
                    self.next();
                }
                TokenKind::RBrack => break,
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }

        let close = self.next();
        Ok(Value::List(List {
            entries,
            range: Range::new(open.range.start, close.range.end),
        }))
    }
}
