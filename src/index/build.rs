//! Builds a [`FileIndex`] from a syntax tree in one walk.
//!
//! Top-level blocks become sections; scalar tokens anywhere in the tree are
//! scanned for interpolations and every resolvable chain becomes a reference
//! owned by the section it sits in. Nodes that do not have the expected shape
//! are skipped so one odd block never empties the whole file.

use std::path::Path;

use super::{FileIndex, Reference, ReferenceKind, Section, SectionType};
use crate::syntax::{scan_interpolations, walk, Body, Item, NodeRef, Value};
use crate::types::Location;

/// Whether `path` holds variable assignments rather than declarations.
pub fn is_variable_definitions(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("tfvars")
}

pub fn build_file_index(file: &Path, body: &Body) -> FileIndex {
    let assignments = is_variable_definitions(file);
    let mut index = FileIndex::empty(file);
    let mut owner: Option<String> = None;

    walk(body, |visit| match visit.node {
        NodeRef::Item(item) if visit.path.len() == 1 => {
            let sections = sections_of(file, item);
            owner = match sections.as_slice() {
                [section] => Some(section.id()),
                _ => None,
            };
            index.sections.extend(sections);

            if assignments {
                index.references.extend(assignment(file, item));
            }
        }
        // an entry of a top-level `locals` block
        NodeRef::Item(item) if visit.path.len() == 4 => {
            if let Some(NodeRef::Item(parent)) = visit.path.get(1) {
                if is_locals_block(parent) {
                    owner = item.first_key().map(|name| format!("local.{name}"));
                }
            }
        }
        NodeRef::Value(Value::Scalar(token)) => match scan_interpolations(token) {
            Ok(exprs) => index.references.extend(
                exprs
                    .iter()
                    .filter_map(|expr| Reference::from_expr(expr, file, owner.as_deref())),
            ),
            Err(err) => index.diagnostics.push(err),
        },
        _ => {}
    });

    index
}

fn is_locals_block(item: &Item) -> bool {
    item.keys.len() == 1
        && SectionType::from_keyword(&item.keys[0].token.text) == Some(SectionType::Local)
        && matches!(item.value, Some(Value::Map(_)))
}

/// The sections declared by one top-level item; usually one, one per entry
/// for `locals`, none for anything else.
fn sections_of(file: &Path, item: &Item) -> Vec<Section> {
    let Some(keyword) = item.keys.first() else {
        return Vec::new();
    };
    let Some(section_type) = SectionType::from_keyword(&keyword.token.text) else {
        return Vec::new();
    };
    // attributes that happen to share a keyword's name are not blocks
    if !matches!(item.value, None | Some(Value::Map(_))) {
        return Vec::new();
    }

    if section_type == SectionType::Local {
        return item
            .value
            .as_ref()
            .and_then(Value::as_map)
            .map(|body| body.items.iter().filter_map(|entry| local(file, entry)).collect())
            .unwrap_or_default();
    }

    let keyword_location = Location::new(file, keyword.token.range);
    let labels = &item.keys[1..];
    let (subtype, name) = if section_type.is_typed() {
        (labels.first(), labels.get(1))
    } else {
        (None, labels.first())
    };

    let type_location = subtype
        .map(|key| Location::new(file, key.token.unquoted_range()))
        .unwrap_or_else(|| keyword_location.clone());
    let name_location = match name {
        Some(key) => Location::new(file, key.token.unquoted_range()),
        None if section_type.is_typed() => type_location.clone(),
        None => keyword_location.clone(),
    };

    vec![Section {
        section_type,
        subtype: section_type
            .is_typed()
            .then(|| subtype.map(|key| key.token.unquoted().to_string()).unwrap_or_default()),
        name: name
            .map(|key| key.token.unquoted().to_string())
            .unwrap_or_default(),
        location: Location::new(file, item.range),
        name_location,
        type_location: section_type.is_typed().then_some(type_location),
        value: item.value.clone(),
    }]
}

fn local(file: &Path, entry: &Item) -> Option<Section> {
    let key = entry.keys.first()?;
    Some(Section {
        section_type: SectionType::Local,
        subtype: None,
        name: key.token.unquoted().to_string(),
        location: Location::new(file, entry.range),
        name_location: Location::new(file, key.token.unquoted_range()),
        type_location: None,
        value: entry.value.clone(),
    })
}

/// `name = value` at the top of a variable definitions file assigns `var.name`.
fn assignment(file: &Path, item: &Item) -> Option<Reference> {
    let [key] = item.keys.as_slice() else {
        return None;
    };
    item.value.as_ref()?;

    Some(Reference {
        target_id: format!("variable.{}", key.token.unquoted()),
        location: Location::new(file, key.token.unquoted_range()),
        value_path: Vec::new(),
        owner: None,
        kind: ReferenceKind::Assignment,
    })
}
