use std::path::Path;

use tower_lsp::lsp_types::{Location, Position};

use crate::index::WorkspaceIndex;
use crate::types::Pos;

/// The id under the cursor: a declaration name, or the target of a reference.
pub fn target_at(index: &WorkspaceIndex, path: &Path, cursor_position: Position) -> Option<String> {
    let pos = Pos::from_lsp(cursor_position);

    index
        .section_at_name(path, pos)
        .map(|section| section.id())
        .or_else(|| {
            index
                .reference_at(path, pos)
                .map(|reference| reference.target_id.clone())
        })
}

pub fn references(
    index: &WorkspaceIndex,
    cursor_position: Position,
    path: &Path,
    include_declaration: bool,
) -> Option<Vec<Location>> {
    let target_id = target_at(index, path, cursor_position)?;

    let declaration = include_declaration
        .then(|| index.resolve(&target_id))
        .flatten()
        .map(|section| section.name_location.clone());

    Some(
        declaration
            .into_iter()
            .chain(index.find_references(&target_id))
            .filter_map(|location| location.to_lsp())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::workspace_index;

    const MAIN: &str = "resource \"aws_s3_bucket\" \"bucket\" {\n  bucket_name = \"${var.region}\"\n}\n\noutput \"arn\" {\n  value = \"${aws_s3_bucket.bucket.arn}-${var.region}\"\n}\n";

    fn index() -> WorkspaceIndex {
        workspace_index(&[
            ("/ws/main.tf", MAIN),
            ("/ws/variables.tf", "variable \"region\" {}\n"),
            ("/ws/prod.tfvars", "region = \"eu-west-1\"\n"),
        ])
    }

    /// Test: from the declaration name, every use is returned.
    #[test]
    fn test_references_from_declaration() {
        let index = index();

        let locations = references(
            &index,
            Position {
                line: 0,
                character: 12,
            },
            Path::new("/ws/variables.tf"),
            false,
        )
        .unwrap();

        assert_eq!(locations.len(), 3);
        assert!(locations[0].uri.path().ends_with("main.tf"));
        assert!(locations[2].uri.path().ends_with("prod.tfvars"));
    }

    /// Test: from a reference, the other references to the same target are returned.
    #[test]
    fn test_references_from_reference_cursor() {
        let index = index();

        let locations = references(
            &index,
            Position {
                line: 5,
                character: 15,
            },
            Path::new("/ws/main.tf"),
            true,
        )
        .unwrap();

        // declaration plus the single use in the output
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].range.start, Position { line: 0, character: 26 });
    }

    #[test]
    fn test_references_no_target_at_cursor() {
        let index = index();

        let result = references(
            &index,
            Position {
                line: 3,
                character: 0,
            },
            Path::new("/ws/main.tf"),
            false,
        );

        assert!(result.is_none());
    }
}
