//! Symbol providers for configuration files.
//!
//! This module implements LSP symbol capabilities:
//! - `textDocument/documentSymbol` - outline view of current file
//! - `workspace/symbol` - fuzzy search across every group
//!
//! # Document Symbols
//!
//! | Section | LSP Kind | Shown as |
//! |---------|----------|----------|
//! | `variable` | `Variable` | `region` |
//! | `output` | `Property` | `bucket_arn` |
//! | `locals` entry | `Constant` | `prefix` |
//! | `module` | `Module` | `vpc` |
//! | `provider` | `Interface` | `aws` |
//! | `resource` | `Class` | `aws_instance.web` |
//! | `data` | `Struct` | `aws_ami.ubuntu` |
//!
//! Symbols are returned in declaration order.
//!
//! # Workspace Symbols
//!
//! Section ids of every group, ranked by [`nucleo_matcher`] score.

use std::path::Path;

use itertools::Itertools;
use nucleo_matcher::{
    pattern::{self, Normalization},
    Matcher,
};
use tower_lsp::lsp_types::{
    DocumentSymbol, DocumentSymbolParams, DocumentSymbolResponse, Location, SymbolInformation,
    SymbolKind, Url, WorkspaceSymbolParams,
};

use crate::index::{Scope, Section, SectionType, Workspace, WorkspaceIndex};

fn symbol_kind(section_type: SectionType) -> SymbolKind {
    match section_type {
        SectionType::Variable => SymbolKind::VARIABLE,
        SectionType::Output => SymbolKind::PROPERTY,
        SectionType::Local => SymbolKind::CONSTANT,
        SectionType::Module => SymbolKind::MODULE,
        SectionType::Provider => SymbolKind::INTERFACE,
        SectionType::Resource => SymbolKind::CLASS,
        SectionType::Data => SymbolKind::STRUCT,
    }
}

fn compute_match_score(
    matcher: &mut Matcher,
    pattern: &pattern::Pattern,
    symbol: SymbolInformation,
) -> (u32, SymbolInformation) {
    let mut buf = Vec::new();
    (
        pattern
            .score(
                nucleo_matcher::Utf32Str::new(symbol.name.as_str(), &mut buf),
                matcher,
            )
            .unwrap_or_default(),
        symbol,
    )
}

#[allow(deprecated)] // field deprecated has been deprecated in favor of using tags and will be removed in the future
fn to_symbol_information(section: &Section) -> Option<SymbolInformation> {
    Some(SymbolInformation {
        name: section.id(),
        kind: symbol_kind(section.section_type),
        location: Location {
            uri: Url::from_file_path(&section.location.file).ok()?,
            range: section.location.range.into(),
        },
        container_name: None,
        tags: None,
        deprecated: None,
    })
}

/// Search for sections across every group of the workspace.
///
/// Returns matches sorted by fuzzy match score, best first.
pub fn workspace_symbol(
    workspace: &Workspace,
    params: &WorkspaceSymbolParams,
) -> Option<Vec<SymbolInformation>> {
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let pattern = pattern::Pattern::parse(
        &params.query,
        pattern::CaseMatching::Smart,
        Normalization::Smart,
    );

    Some(
        workspace
            .groups()
            .flat_map(|group| group.index.query(Scope::AllFiles, None))
            .filter_map(to_symbol_information)
            .map(|symbol| compute_match_score(&mut matcher, &pattern, symbol))
            .filter(|(score, _)| *score > 0)
            .sorted_by(|(a, _), (b, _)| Ord::cmp(b, a))
            .map(|(_score, symbol)| symbol)
            .collect_vec(),
    )
}

/// Outline of one file, or `None` if it declares nothing.
#[allow(deprecated)] // field deprecated has been deprecated in favor of using tags
pub fn document_symbol(
    index: &WorkspaceIndex,
    _params: &DocumentSymbolParams,
    path: &Path,
) -> Option<DocumentSymbolResponse> {
    let symbols = index
        .query(Scope::File(path), None)
        .into_iter()
        .map(|section| DocumentSymbol {
            name: match &section.subtype {
                Some(subtype) => format!("{subtype}.{}", section.name),
                None => section.name.clone(),
            },
            detail: Some(section.section_type.to_string()),
            kind: symbol_kind(section.section_type),
            range: section.location.range.into(),
            selection_range: section.name_location.range.into(),
            deprecated: None,
            tags: None,
            children: None,
        })
        .collect_vec();

    if symbols.is_empty() {
        return None;
    }

    Some(DocumentSymbolResponse::Nested(symbols))
}
