use std::path::Path;

use tower_lsp::lsp_types::{CodeLens, Command, Range};

use crate::index::{Scope, WorkspaceIndex};

/// Client command a lens runs; takes the uri, the position and the locations.
pub const SHOW_REFERENCES: &str = "hcl-index.showReferences";

/// One "N references" lens on the first line of every section in `path`.
pub fn code_lens(index: &WorkspaceIndex, path: &Path) -> Option<Vec<CodeLens>> {
    let lenses: Vec<CodeLens> = index
        .query(Scope::File(path), None)
        .into_iter()
        .filter_map(|section| {
            let start = section.location.range.start.to_lsp();
            let references = index
                .find_references(&section.id())
                .iter()
                .filter_map(|location| location.to_lsp())
                .collect::<Vec<_>>();
            let arguments = vec![
                serde_json::to_value(section.location.to_lsp()?.uri).ok()?,
                serde_json::to_value(start).ok()?,
                serde_json::to_value(&references).ok()?,
            ];

            Some(CodeLens {
                range: Range { start, end: start },
                command: Some(Command {
                    title: reference_title(references.len()),
                    command: SHOW_REFERENCES.to_string(),
                    arguments: Some(arguments),
                }),
                data: None,
            })
        })
        .collect();

    if lenses.is_empty() {
        return None;
    }

    Some(lenses)
}

fn reference_title(count: usize) -> String {
    match count {
        1 => "1 reference".to_string(),
        n => format!("{n} references"),
    }
}
