use std::path::Path;

use tower_lsp::lsp_types::{Location, Position};

use crate::index::WorkspaceIndex;
use crate::types::Pos;

/// The declaration name of whatever the reference under the cursor points at.
pub fn goto_definition(
    index: &WorkspaceIndex,
    cursor_position: Position,
    path: &Path,
) -> Option<Vec<Location>> {
    let location = index.find_definition(path, Pos::from_lsp(cursor_position))?;

    Some(vec![location.to_lsp()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::workspace_index;

    /// Test: the cursor on `var.region` jumps to the name in the other file.
    #[test]
    fn test_goto_definition_variable() {
        let index = workspace_index(&[
            ("/ws/main.tf", "output \"o\" {\n  value = \"${var.region}\"\n}\n"),
            ("/ws/variables.tf", "variable \"region\" {}\n"),
        ]);

        // line 1, inside `var.region` (0-based)
        let locations = goto_definition(
            &index,
            Position {
                line: 1,
                character: 15,
            },
            Path::new("/ws/main.tf"),
        )
        .unwrap();

        assert_eq!(locations.len(), 1);
        assert!(locations[0].uri.path().ends_with("/ws/variables.tf"));
        assert_eq!(locations[0].range.start, Position { line: 0, character: 10 });
        assert_eq!(locations[0].range.end, Position { line: 0, character: 16 });
    }

    /// Test: a cursor outside every reference yields nothing.
    #[test]
    fn test_goto_definition_no_reference_at_cursor() {
        let index = workspace_index(&[("/ws/main.tf", "variable \"region\" {}\n")]);

        let result = goto_definition(
            &index,
            Position {
                line: 0,
                character: 2,
            },
            Path::new("/ws/main.tf"),
        );

        assert!(result.is_none());
    }

    /// Test: references to undeclared targets are not an error.
    #[test]
    fn test_goto_definition_unresolved() {
        let index = workspace_index(&[(
            "/ws/main.tf",
            "output \"o\" { value = \"${module.missing.id}\" }\n",
        )]);

        let result = goto_definition(
            &index,
            Position {
                line: 0,
                character: 26,
            },
            Path::new("/ws/main.tf"),
        );

        assert!(result.is_none());
    }
}
