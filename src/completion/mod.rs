use tower_lsp::lsp_types::{CompletionItem, CompletionList, CompletionParams, CompletionResponse};

use crate::index::WorkspaceIndex;

use self::keyword_completer::KeywordCompleter;
use self::reference_completer::ReferenceCompleter;

mod functions;
mod keyword_completer;
mod reference_completer;

pub use functions::{BuiltinFunction, BUILTIN_FUNCTIONS};

#[derive(Clone, Copy)]
pub struct Context<'a> {
    index: &'a WorkspaceIndex,
    /// Text of the line holding the cursor.
    line_text: &'a str,
}

impl Context<'_> {
    /// The line up to the cursor, counted in characters.
    fn text_before(&self, character: usize) -> String {
        self.line_text.chars().take(character).collect()
    }
}

pub trait Completer<'a>: Sized {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self>;

    fn completions(&self) -> Vec<impl Completable<'a, Self>>;
}

pub trait Completable<'a, T: Completer<'a>>: Sized {
    fn completions(&self, completer: &T) -> Option<CompletionItem>;
}

pub fn get_completions(
    index: &WorkspaceIndex,
    params: &CompletionParams,
    line_text: &str,
) -> Option<CompletionResponse> {
    let completion_context = Context { index, line_text };
    let position = params.text_document_position.position;

    run_completer::<ReferenceCompleter>(completion_context, position.line, position.character)
        .or_else(|| {
            run_completer::<KeywordCompleter>(
                completion_context,
                position.line,
                position.character,
            )
        })
}

fn run_completer<'a, T: Completer<'a>>(
    context: Context<'a>,
    line: u32,
    character: u32,
) -> Option<CompletionResponse> {
    let completer = T::construct(context, line as usize, character as usize)?;

    let items = completer
        .completions()
        .into_iter()
        .filter_map(|completable| completable.completions(&completer))
        .collect::<Vec<CompletionItem>>();

    if items.is_empty() {
        return None;
    }

    Some(CompletionResponse::List(CompletionList {
        is_incomplete: true,
        items,
    }))
}
