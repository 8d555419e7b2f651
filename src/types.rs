//! Core position types shared by the syntax tree and the index.
//!
//! This module contains the location primitives used throughout the crate:
//! - `Pos`: a 1-based line/column pair plus a byte offset
//! - `Range`: a half-open span between two positions
//! - `Location`: a range inside a specific file
//!
//! LSP positions are 0-based; conversions live here so that nothing else in
//! the crate has to think about the off-by-one.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{self, Url};

/// A position in a source file.
///
/// `line` and `column` are 1-based, `column` counts characters (not bytes).
/// `offset` is the byte offset from the start of the file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize, offset: usize) -> Pos {
        Pos {
            line,
            column,
            offset,
        }
    }

    /// A position without a known byte offset, e.g. a cursor coming from the editor.
    pub fn at(line: usize, column: usize) -> Pos {
        Pos::new(line, column, 0)
    }

    /// Converts a 0-based LSP position.
    pub fn from_lsp(position: lsp_types::Position) -> Pos {
        Pos::at(position.line as usize + 1, position.character as usize + 1)
    }

    pub fn to_lsp(self) -> lsp_types::Position {
        lsp_types::Position {
            line: self.line.saturating_sub(1) as u32,
            character: self.column.saturating_sub(1) as u32,
        }
    }

    /// The position `n` characters further on the same line.
    pub fn advance(self, chars: usize, bytes: usize) -> Pos {
        Pos::new(self.line, self.column + chars, self.offset + bytes)
    }

    /// Orders by line and column only; offsets are ignored so editor cursors
    /// (which have none) compare correctly against indexed positions.
    pub fn cmp_line_col(&self, other: &Pos) -> Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

/// A half-open span `[start, end)` within one file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Pos,
    pub end: Pos,
}

impl Range {
    pub fn new(start: Pos, end: Pos) -> Range {
        Range { start, end }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.start.cmp_line_col(&pos) != Ordering::Greater
            && pos.cmp_line_col(&self.end) == Ordering::Less
    }

    pub fn includes(&self, other: &Range) -> bool {
        self.start.cmp_line_col(&other.start) != Ordering::Greater
            && other.end.cmp_line_col(&self.end) != Ordering::Greater
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start.cmp_line_col(&other.end) == Ordering::Less
            && other.start.cmp_line_col(&self.end) == Ordering::Less
    }

    /// The source text covered by this range.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start.offset..self.end.offset)
    }
}

impl From<Range> for lsp_types::Range {
    fn from(range: Range) -> Self {
        lsp_types::Range {
            start: range.start.to_lsp(),
            end: range.end.to_lsp(),
        }
    }
}

/// A range inside a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub range: Range,
}

impl Location {
    pub fn new(file: &Path, range: Range) -> Location {
        Location {
            file: file.to_path_buf(),
            range,
        }
    }

    pub fn to_lsp(&self) -> Option<lsp_types::Location> {
        Some(lsp_types::Location {
            uri: Url::from_file_path(&self.file).ok()?,
            range: self.range.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range::new(Pos::at(sl, sc), Pos::at(el, ec))
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = range(1, 5, 1, 10);

        assert!(r.contains(Pos::at(1, 5)));
        assert!(r.contains(Pos::at(1, 9)));
        assert!(!r.contains(Pos::at(1, 10)));
        assert!(!r.contains(Pos::at(1, 4)));
        assert!(!r.contains(Pos::at(2, 6)));
    }

    #[test]
    fn test_contains_multiline() {
        let r = range(2, 8, 4, 2);

        assert!(r.contains(Pos::at(3, 1)));
        assert!(r.contains(Pos::at(2, 100)));
        assert!(!r.contains(Pos::at(4, 2)));
    }

    #[test]
    fn test_overlaps() {
        assert!(range(1, 1, 1, 5).overlaps(&range(1, 4, 1, 8)));
        assert!(!range(1, 1, 1, 5).overlaps(&range(1, 5, 1, 8)));
    }

    #[test]
    fn test_lsp_conversion_is_zero_based() {
        let lsp: lsp_types::Range = range(1, 1, 3, 4).into();

        assert_eq!(lsp.start.line, 0);
        assert_eq!(lsp.start.character, 0);
        assert_eq!(lsp.end.line, 2);
        assert_eq!(lsp.end.character, 3);

        let back = Pos::from_lsp(lsp.end);
        assert_eq!((back.line, back.column), (3, 4));
    }
}
