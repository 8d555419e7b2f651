//! Keyword Completer
//!
//! Offers block snippets for section keywords typed at the start of a line,
//! e.g. `res|` completes to a `resource "type" "name" { }` skeleton.

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, InsertTextFormat, Position, Range,
    TextEdit,
};

use super::{Completable, Completer, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub name: &'static str,
    kind: CompletionItemKind,
    snippet: &'static str,
}

pub static KEYWORDS: [Keyword; 7] = [
    Keyword {
        name: "variable",
        kind: CompletionItemKind::VARIABLE,
        snippet: "variable \"${1:name}\" {\n  default = ${2:value}\n}\n",
    },
    Keyword {
        name: "output",
        kind: CompletionItemKind::VARIABLE,
        snippet: "output \"${1:name}\" {\n  value = ${2:value}\n}\n",
    },
    Keyword {
        name: "resource",
        kind: CompletionItemKind::INTERFACE,
        snippet: "resource \"${1:type}\" \"${2:name}\" {\n  $0\n}\n",
    },
    Keyword {
        name: "data",
        kind: CompletionItemKind::INTERFACE,
        snippet: "data \"${1:type}\" \"${2:name}\" {\n  $0\n}\n",
    },
    Keyword {
        name: "locals",
        kind: CompletionItemKind::CLASS,
        snippet: "locals {\n  $0\n}\n",
    },
    Keyword {
        name: "module",
        kind: CompletionItemKind::MODULE,
        snippet: "module \"${1:name}\" {\n  source = \"${2:source}\"\n  $0\n}\n",
    },
    Keyword {
        name: "provider",
        kind: CompletionItemKind::MODULE,
        snippet: "provider \"${1:name}\" {\n  $0\n}\n",
    },
];

pub struct KeywordCompleter {
    partial: String,
    line: u32,
    character: u32,
}

impl<'a> Completer<'a> for KeywordCompleter {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self> {
        static PARTIAL_KEYWORD: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^(?<partial>[a-z]*)$").unwrap());

        let before = context.text_before(character);
        let captures = PARTIAL_KEYWORD.captures(&before)?;

        Some(KeywordCompleter {
            partial: captures.name("partial")?.as_str().to_string(),
            line: line as u32,
            character: character as u32,
        })
    }

    fn completions(&self) -> Vec<impl Completable<'a, Self>> {
        KEYWORDS
            .iter()
            .filter(|keyword| keyword.name.starts_with(&self.partial))
            .copied()
            .collect()
    }
}

impl Completable<'_, KeywordCompleter> for Keyword {
    fn completions(&self, completer: &KeywordCompleter) -> Option<CompletionItem> {
        Some(CompletionItem {
            label: self.name.to_string(),
            kind: Some(self.kind),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range: Range {
                    start: Position {
                        line: completer.line,
                        character: 0,
                    },
                    end: Position {
                        line: completer.line,
                        character: completer.character,
                    },
                },
                new_text: self.snippet.to_string(),
            })),
            ..Default::default()
        })
    }
}
