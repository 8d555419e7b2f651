use std::path::Path;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Url};
use tower_lsp::Client;
use tracing::warn;

use crate::syntax::ParseError;

/// Receives the parse errors of a file; an empty vector clears them.
pub trait DiagnosticsSink: Send + Sync {
    fn publish(&self, file: &Path, errors: Vec<ParseError>);
}

/// Publishes diagnostics to the editor.
pub struct ClientSink {
    client: Client,
}

impl ClientSink {
    pub fn new(client: Client) -> ClientSink {
        ClientSink { client }
    }
}

impl DiagnosticsSink for ClientSink {
    fn publish(&self, file: &Path, errors: Vec<ParseError>) {
        let Ok(uri) = Url::from_file_path(file) else {
            return;
        };
        let diagnostics = errors.iter().map(to_diagnostic).collect();
        let client = self.client.clone();

        // publishing is fire and forget; callers may hold the index lock
        tokio::spawn(async move {
            client.publish_diagnostics(uri, diagnostics, None).await;
        });
    }
}

/// Logs parse errors; used when indexing without an editor attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn publish(&self, file: &Path, errors: Vec<ParseError>) {
        for error in errors {
            warn!(
                file = %file.display(),
                line = error.range.start.line,
                column = error.range.start.column,
                "{}",
                error.message
            );
        }
    }
}

pub fn to_diagnostic(error: &ParseError) -> Diagnostic {
    let mut range = error.range;
    // zero-width errors (end of file) still need something to underline
    if range.start == range.end {
        range.end = range.start.advance(1, 1);
    }

    Diagnostic {
        range: range.into(),
        message: error.message.clone(),
        source: Some("hcl-index".into()),
        severity: Some(DiagnosticSeverity::ERROR),
        ..Default::default()
    }
}
