//! Reference Completer
//!
//! Completes section references and built-in functions inside string
//! interpolations.
//!
//! ## Trigger Pattern
//! - `"${` - all referenceable sections, then all functions
//! - `"${var.re` - variables whose name starts with `re`
//! - `"${aws_` - resources and outputs starting with `aws_`, plus functions
//! - `"` - same as `"${`, but the inserted text is wrapped in `${...}`
//!
//! The filter is the text after the last operator or bracket inside the
//! interpolation. Sections sort before functions.

use itertools::Itertools;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, InsertTextFormat, Position, Range,
    TextEdit,
};

use crate::index::{Scope, Section, SectionFilter, SectionType, WorkspaceIndex};

use super::functions::{BuiltinFunction, BUILTIN_FUNCTIONS};
use super::{Completable, Completer, Context};

const FILTER_DELIMITERS: &[char] = &['(', '{', '[', ' ', '+', '/', ']', '}', ',', '!', '<', '>', '=', '?', ':'];

/// Reference prefixes that do not match the id prefix of their target.
const NAMESPACES: [(&str, &str); 4] = [
    ("var.", "variable."),
    ("local.", "local."),
    ("module.", "module."),
    ("data.", "data."),
];

/// Id prefixes of the sections a partially typed reference can complete to.
pub(super) fn id_prefixes(filter: &str) -> Vec<String> {
    for (namespace, id_namespace) in NAMESPACES {
        if let Some(rest) = filter.strip_prefix(namespace) {
            return vec![format!("{id_namespace}{rest}")];
        }
    }

    NAMESPACES
        .iter()
        .filter(|(namespace, _)| namespace.starts_with(filter))
        .map(|(_, id_namespace)| id_namespace.to_string())
        .chain([format!("resource.{filter}"), format!("output.{filter}")])
        .collect()
}

/// Byte offset of the last `${` in `text` that opens an interpolation. A
/// `$${` is an escaped literal, so the opener needs an odd run of `$`.
fn interpolation_start(text: &str) -> Option<usize> {
    let start = text.rfind("${")?;
    let dollars = text[..=start].bytes().rev().take_while(|b| *b == b'$').count();
    (dollars % 2 == 1).then_some(start)
}

/// Whether the cursor at the end of `text` is inside a quoted string.
fn inside_string(text: &str) -> bool {
    let mut inside = false;
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '"' if !escaped => inside = !inside,
            _ => {}
        }
        escaped = false;
    }
    inside
}

pub struct ReferenceCompleter<'a> {
    index: &'a WorkspaceIndex,
    filter: String,
    /// The cursor sits right after an opening quote, so `${` must be inserted too.
    wrap_interpolation: bool,
    line: u32,
    character: u32,
}

impl ReferenceCompleter<'_> {
    fn text_edit(&self, new_text: String) -> CompletionTextEdit {
        let filter_len = self.filter.chars().count() as u32;
        CompletionTextEdit::Edit(TextEdit {
            range: Range {
                start: Position {
                    line: self.line,
                    character: self.character.saturating_sub(filter_len),
                },
                end: Position {
                    line: self.line,
                    character: self.character,
                },
            },
            new_text,
        })
    }

    fn wrap(&self, text: String) -> String {
        if self.wrap_interpolation {
            format!("${{{text}}}")
        } else {
            text
        }
    }
}

impl<'a> Completer<'a> for ReferenceCompleter<'a> {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self> {
        let before = context.text_before(character);

        if before.contains("${") && interpolation_start(&before).is_none() {
            return None;
        }

        let (expression, wrap_interpolation) = match interpolation_start(&before) {
            Some(start) => {
                let expression = &before[start + 2..];
                if expression.contains('}') {
                    return None;
                }
                (expression, false)
            }
            None if before.ends_with('"') && inside_string(&before) => ("", true),
            None => return None,
        };

        let filter_start = expression
            .rfind(FILTER_DELIMITERS)
            .map_or(0, |delimiter| delimiter + 1);

        Some(ReferenceCompleter {
            index: context.index,
            filter: expression[filter_start..].trim().to_string(),
            wrap_interpolation,
            line: line as u32,
            character: character as u32,
        })
    }

    fn completions(&self) -> Vec<impl Completable<'a, Self>> {
        let sections = if self.filter.is_empty() {
            self.index.query(Scope::AllFiles, None)
        } else {
            id_prefixes(&self.filter)
                .iter()
                .flat_map(|prefix| {
                    self.index
                        .query(Scope::AllFiles, Some(SectionFilter::Prefix(prefix)))
                })
                .collect()
        };

        let functions = BUILTIN_FUNCTIONS
            .iter()
            .filter(|function| function.name.starts_with(self.filter.as_str()));

        sections
            .into_iter()
            .unique_by(|section| section.id())
            .map(Candidate::Section)
            .chain(functions.map(Candidate::Function))
            .collect()
    }
}

enum Candidate<'a> {
    Section(&'a Section),
    Function(&'static BuiltinFunction),
}

fn section_kind(section_type: SectionType) -> CompletionItemKind {
    match section_type {
        SectionType::Variable => CompletionItemKind::VARIABLE,
        SectionType::Output => CompletionItemKind::VALUE,
        SectionType::Local => CompletionItemKind::CONSTANT,
        SectionType::Module => CompletionItemKind::MODULE,
        SectionType::Resource => CompletionItemKind::CLASS,
        SectionType::Data => CompletionItemKind::STRUCT,
        SectionType::Provider => CompletionItemKind::INTERFACE,
    }
}

impl<'a> Completable<'a, ReferenceCompleter<'a>> for Candidate<'a> {
    fn completions(&self, completer: &ReferenceCompleter<'a>) -> Option<CompletionItem> {
        match self {
            Candidate::Section(section) => {
                let label = section.reference_text(&section.name)?;
                let id = section.id();

                Some(CompletionItem {
                    kind: Some(section_kind(section.section_type)),
                    detail: Some(id.clone()),
                    sort_text: Some(format!("000-{id}")),
                    filter_text: Some(label.clone()),
                    text_edit: Some(completer.text_edit(completer.wrap(label.clone()))),
                    label,
                    ..Default::default()
                })
            }
            Candidate::Function(function) => Some(CompletionItem {
                label: function.prototype(),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some(function.description.to_string()),
                sort_text: Some(format!("001-{}", function.name)),
                filter_text: Some(function.name.to_string()),
                insert_text_format: Some(InsertTextFormat::SNIPPET),
                text_edit: Some(
                    completer.text_edit(function.snippet(completer.wrap_interpolation)),
                ),
                ..Default::default()
            }),
        }
    }
}
