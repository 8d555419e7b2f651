use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::build::build_file_index;
use super::{Reference, Section};
use crate::syntax::{ParseError, SyntaxParser};
use crate::types::Pos;

/// Everything indexed from one file. Replaced wholesale on every reindex.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileIndex {
    pub file: PathBuf,
    /// Declaration order.
    pub sections: Vec<Section>,
    /// Source order.
    pub references: Vec<Reference>,
    #[serde(skip)]
    pub diagnostics: Vec<ParseError>,
}

impl FileIndex {
    pub fn empty(file: &Path) -> FileIndex {
        FileIndex {
            file: file.to_path_buf(),
            ..Default::default()
        }
    }

    /// Parses and indexes `text`. A parse failure yields the error and no index.
    pub fn from_source(
        parser: &dyn SyntaxParser,
        file: &Path,
        text: &str,
    ) -> Result<FileIndex, ParseError> {
        let body = parser.parse(text)?;
        Ok(build_file_index(file, &body))
    }

    pub fn reference_at(&self, pos: Pos) -> Option<&Reference> {
        self.references
            .iter()
            .find(|reference| reference.location.range.contains(pos))
    }

    /// The section whose name is under `pos`.
    pub fn section_at_name(&self, pos: Pos) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.name_location.range.contains(pos))
    }

    /// The innermost section containing `pos`.
    pub fn section_at(&self, pos: Pos) -> Option<&Section> {
        self.sections
            .iter()
            .filter(|section| section.location.range.contains(pos))
            .min_by_key(|section| {
                let range = section.location.range;
                (range.end.line - range.start.line, range.end.column)
            })
    }
}
