use std::iter;
use std::path::Path;

use tower_lsp::lsp_types::{
    DocumentChangeOperation, DocumentChanges, OneOf, OptionalVersionedTextDocumentIdentifier,
    RenameParams, TextDocumentEdit, TextEdit, Url, WorkspaceEdit,
};

use crate::index::{ReferenceKind, Section, WorkspaceIndex};
use crate::types::{Location, Pos};

/// The section under the cursor, either by its name or through a reference.
fn section_at<'a>(index: &'a WorkspaceIndex, path: &Path, pos: Pos) -> Option<&'a Section> {
    index.section_at_name(path, pos).or_else(|| {
        let reference = index.reference_at(path, pos)?;
        index.resolve(&reference.target_id)
    })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn edit(location: &Location, new_text: String) -> Option<DocumentChangeOperation> {
    Some(DocumentChangeOperation::Edit(TextDocumentEdit {
        text_document: OptionalVersionedTextDocumentIdentifier {
            uri: Url::from_file_path(&location.file).ok()?,
            version: None,
        },
        edits: vec![OneOf::Left(TextEdit {
            range: location.range.into(),
            new_text,
        })],
    }))
}

/// Renames a declaration and rewrites every reference to it.
pub fn rename(index: &WorkspaceIndex, params: &RenameParams, path: &Path) -> Option<WorkspaceEdit> {
    let position = Pos::from_lsp(params.text_document_position.position);
    let new_name = params.new_name.as_str();
    if !is_valid_name(new_name) {
        return None;
    }

    let section = section_at(index, path, position)?;
    let declaration_change = edit(&section.name_location, new_name.to_string());

    let reference_text = section.reference_text(new_name);
    let references_changes = index
        .references_to(&section.id())
        .into_iter()
        .filter_map(|reference| {
            let new_text = match reference.kind {
                ReferenceKind::Assignment => new_name.to_string(),
                ReferenceKind::Interpolation => reference_text.clone()?,
            };
            edit(&reference.location, new_text)
        });

    Some(WorkspaceEdit {
        document_changes: Some(DocumentChanges::Operations(
            references_changes
                .chain(iter::once(declaration_change).flatten())
                .collect(),
        )),
        ..Default::default()
    })
}
