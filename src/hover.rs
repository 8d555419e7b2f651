//! Hover provider for configuration files.
//!
//! Hovering a reference shows the value it reads out of its target:
//!
//! | Target | Shows |
//! |--------|-------|
//! | `var.name` | the variable's `default` |
//! | `local.name` | the local's value |
//! | `module.m.attr`, `type.name.attr`, ... | the block's `attr` attribute |
//!
//! Splat accessors and references without an attribute show nothing.
//!
//! # Configuration
//!
//! Hover can be disabled via [`Settings::hover`]:
//!
//! ```json
//! { "hover": false }
//! ```

use std::path::Path;

use tower_lsp::lsp_types::{Hover, HoverContents, HoverParams, MarkupContent, MarkupKind};

use crate::config::Settings;
use crate::index::{Reference, SectionType, WorkspaceIndex};
use crate::syntax::{render, Value};
use crate::types::Pos;

/// Markdown describing the value `reference` reads, or `None` when there is
/// nothing to show.
pub fn hover_text(index: &WorkspaceIndex, reference: &Reference) -> Option<String> {
    let Some(section) = index.resolve(&reference.target_id) else {
        return Some(format!("Unknown target `{}`", reference.target_id));
    };

    let (label, value) = match section.section_type {
        SectionType::Variable => ("default", section.attribute("default")),
        SectionType::Local => (section.name.as_str(), section.value.as_ref()),
        _ => {
            let attribute = reference.attribute()?;
            (attribute, section.attribute(attribute))
        }
    };

    let Some(value) = value else {
        return Some(format!("`{label}` not specified"));
    };

    Some(match value {
        Value::Scalar(_) => format!("{label}: {}", render(value, 0)),
        Value::List(list) if list.entries.is_empty() => format!("{label}: *empty list*"),
        Value::Map(map) if map.body.items.is_empty() => format!("{label}: *empty map*"),
        _ => format!("{label}:\n{}", render(value, 0)),
    })
}

pub fn hover(
    index: &WorkspaceIndex,
    params: &HoverParams,
    path: &Path,
    settings: &Settings,
) -> Option<Hover> {
    if !settings.hover {
        return None;
    }

    let position = Pos::from_lsp(params.text_document_position_params.position);
    let reference = index.reference_at(path, position)?;

    hover_text(index, reference).map(|value| Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(reference.location.range.into()),
    })
}
