use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::syntax::ExprRef;
use crate::types::Location;

/// Roots that never name a declaration.
const BUILTIN_ROOTS: &[&str] = &[
    "count",
    "path",
    "self",
    "terraform",
    "each",
    "true",
    "false",
    "null",
    "for",
    "in",
    "if",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// `${...}` inside a string or heredoc
    Interpolation,
    /// A top-level `name = value` in a variable definitions file
    Assignment,
}

/// A use of a section's id in one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub target_id: String,
    /// Covers only the base reference, e.g. `var.region` in `var.region.id`.
    pub location: Location,
    /// Accessors after the base reference; splats are `"*"`, indexes keep
    /// their brackets.
    pub value_path: Vec<String>,
    /// Id of the section the reference sits in.
    pub owner: Option<String>,
    pub kind: ReferenceKind,
}

impl Reference {
    /// Resolves the base of an interpolation chain, or `None` for chains that
    /// cannot name a declaration (builtins, incomplete `var.` prefixes).
    pub fn from_expr(expr: &ExprRef, file: &Path, owner: Option<&str>) -> Option<Reference> {
        if BUILTIN_ROOTS.contains(&expr.root.as_str()) {
            return None;
        }

        let names: Vec<Option<&str>> = expr.accessors.iter().map(|(a, _)| a.name()).collect();
        let first = names.first().copied().flatten();
        let second = names.get(1).copied().flatten();

        let (target_id, consumed) = match (expr.root.as_str(), first, second) {
            ("var", Some(name), _) => (format!("variable.{name}"), 1),
            ("local", Some(name), _) => (format!("local.{name}"), 1),
            ("module", Some(name), _) => (format!("module.{name}"), 1),
            ("data", Some(subtype), Some(name)) => (format!("data.{subtype}.{name}"), 2),
            ("var" | "local" | "module" | "data", _, _) => return None,
            (subtype, Some(name), _) => (format!("resource.{subtype}.{name}"), 1),
            (name, None, _) => (format!("output.{name}"), 0),
        };

        Some(Reference {
            target_id,
            location: Location::new(file, expr.span(consumed)),
            value_path: expr.accessors[consumed..]
                .iter()
                .map(|(accessor, _)| accessor.segment())
                .collect(),
            owner: owner.map(str::to_string),
            kind: ReferenceKind::Interpolation,
        })
    }

    /// The first accessor after the base when it names an attribute.
    pub fn attribute(&self) -> Option<&str> {
        self.value_path
            .first()
            .map(String::as_str)
            .filter(|segment| *segment != "*" && !segment.starts_with('['))
    }
}
