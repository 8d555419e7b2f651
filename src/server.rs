//! Language server binding the index to LSP requests.
//!
//! Every workspace folder becomes a [`Group`](crate::index::Group). Folders
//! are crawled once the client reports `initialized`; requests that read the
//! index wait for the first crawl to finish so answers are never computed
//! against a half-built workspace.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ropey::Rope;
use tokio::sync::{watch, RwLock};
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::{
    CodeLens, CodeLensOptions, CodeLensParams, CompletionOptions, CompletionParams,
    CompletionResponse, DidChangeConfigurationParams, DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions, DidChangeWorkspaceFoldersParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    DocumentSymbolParams, DocumentSymbolResponse, FileChangeType, FileSystemWatcher, GlobPattern,
    GotoDefinitionParams, GotoDefinitionResponse, Hover, HoverParams, HoverProviderCapability,
    InitializeParams, InitializeResult, InitializedParams, Location, MessageType, OneOf,
    ReferenceParams, Registration, RenameParams, SaveOptions, ServerCapabilities, ServerInfo,
    SymbolInformation, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, Url, WatchKind, WorkspaceEdit, WorkspaceFoldersServerCapabilities,
    WorkspaceServerCapabilities, WorkspaceSymbolParams,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::coordinator::IndexCoordinator;
use crate::diagnostics::ClientSink;
use crate::index::Workspace;
use crate::{codelens, completion, gotodef, hover, references, rename, symbol};

fn uri_to_path(uri: &Url) -> Result<PathBuf> {
    uri.to_file_path()
        .map_err(|()| Error::invalid_params(format!("not a file uri: {uri}")))
}

pub struct Backend {
    client: Client,
    coordinator: IndexCoordinator,
    /// Open documents, kept for completion line lookups.
    documents: RwLock<HashMap<PathBuf, Rope>>,
    /// Flips to `true` once the initial crawl of every root is done.
    ready: Arc<watch::Sender<bool>>,
}

impl Backend {
    pub fn new(client: Client) -> Backend {
        let sink = Arc::new(ClientSink::new(client.clone()));
        let workspace = Arc::new(RwLock::new(Workspace::default()));
        let (ready, _) = watch::channel(false);

        Backend {
            client,
            coordinator: IndexCoordinator::new(workspace, Settings::default(), sink),
            documents: RwLock::new(HashMap::new()),
            ready: Arc::new(ready),
        }
    }

    async fn wait_ready(&self) {
        let mut ready = self.ready.subscribe();
        // the sender lives as long as the backend
        let _ = ready.wait_for(|ready| *ready).await;
    }

    fn spawn_crawl(&self, roots: Vec<PathBuf>, mark_ready: bool) {
        let coordinator = self.coordinator.clone();
        let ready = self.ready.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            for root in roots {
                if let Err(err) = coordinator.crawl(&root).await {
                    warn!(root = %root.display(), %err, "crawl failed");
                    client
                        .log_message(
                            MessageType::ERROR,
                            format!("failed to index {}: {err}", root.display()),
                        )
                        .await;
                }
            }
            if mark_ready {
                ready.send_replace(true);
            }
        });
    }

    async fn register_file_watcher(&self) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String("**/*.{tf,tfvars}".to_string()),
                kind: Some(WatchKind::all()),
            }],
        };
        let register_options = match serde_json::to_value(options) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "failed to encode watcher registration");
                return;
            }
        };
        let registration = Registration {
            id: "hcl-index-file-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };

        if let Err(err) = self.client.register_capability(vec![registration]).await {
            warn!(%err, "failed to register file watcher");
        }
    }

    async fn line_text(&self, path: &Path, line: usize) -> Option<String> {
        let documents = self.documents.read().await;
        let rope = documents.get(path)?;
        let line = rope.get_line(line)?.to_string();
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let roots: Vec<PathBuf> = match params.workspace_folders {
            Some(folders) if !folders.is_empty() => folders
                .iter()
                .filter_map(|folder| folder.uri.to_file_path().ok())
                .collect(),
            _ => params
                .root_uri
                .and_then(|uri| uri.to_file_path().ok())
                .into_iter()
                .collect(),
        };

        if let Some(root) = roots.first() {
            match Settings::new(root) {
                Ok(settings) => self.coordinator.update_settings(settings).await,
                Err(err) => warn!(%err, "failed to load settings, using defaults"),
            }
        }
        if let Some(options) = params.initialization_options {
            let settings = self.coordinator.settings().await.merge_json(&options);
            self.coordinator.update_settings(settings).await;
        }
        {
            let mut workspace = self.coordinator.workspace().write().await;
            for root in &roots {
                workspace.add_root(root);
            }
        }
        info!(roots = roots.len(), "initialize");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        will_save: None,
                        will_save_wait_until: None,
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                    },
                )),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        ".".to_string(),
                        "{".to_string(),
                        "\"".to_string(),
                    ]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.register_file_watcher().await;

        let roots = self
            .coordinator
            .workspace()
            .read()
            .await
            .roots()
            .map(Path::to_path_buf)
            .collect();
        self.spawn_crawl(roots, true);
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutdown");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Ok(path) = uri_to_path(&params.text_document.uri) else {
            return;
        };
        let text = params.text_document.text;
        debug!(path = %path.display(), "did_open");

        self.documents
            .write()
            .await
            .insert(path.clone(), Rope::from_str(&text));
        self.coordinator.index_text(&path, &text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Ok(path) = uri_to_path(&params.text_document.uri) else {
            return;
        };
        // full sync: the last change holds the whole document
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };

        self.documents
            .write()
            .await
            .insert(path.clone(), Rope::from_str(&change.text));
        self.coordinator.on_edit(&path, change.text).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let Ok(path) = uri_to_path(&params.text_document.uri) else {
            return;
        };
        if let Some(text) = &params.text {
            self.documents
                .write()
                .await
                .insert(path.clone(), Rope::from_str(text));
        }
        self.coordinator.on_save(&path, params.text).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let Ok(path) = uri_to_path(&params.text_document.uri) else {
            return;
        };
        self.documents.write().await.remove(&path);
        self.coordinator.on_close(&path).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for change in params.changes {
            let Ok(path) = uri_to_path(&change.uri) else {
                continue;
            };
            debug!(path = %path.display(), kind = ?change.typ, "watched file changed");

            match change.typ {
                FileChangeType::CREATED => {
                    self.coordinator.on_created(&path).await;
                }
                FileChangeType::CHANGED => {
                    self.coordinator.on_changed(&path).await;
                }
                FileChangeType::DELETED => self.coordinator.on_deleted(&path).await,
                _ => {}
            }
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = self.coordinator.settings().await.merge_json(&params.settings);
        self.coordinator.update_settings(settings).await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        for folder in params.event.removed {
            if let Ok(root) = folder.uri.to_file_path() {
                self.coordinator.remove_root(&root).await;
            }
        }

        let added = params
            .event
            .added
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
        self.spawn_crawl(added, false);
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        self.wait_ready().await;
        let position = params.text_document_position_params;
        let path = uri_to_path(&position.text_document.uri)?;

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(gotodef::goto_definition(index, position.position, &path)
            .map(GotoDefinitionResponse::Array))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        self.wait_ready().await;
        let position = params.text_document_position;
        let path = uri_to_path(&position.text_document.uri)?;

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(references::references(
            index,
            position.position,
            &path,
            params.context.include_declaration,
        ))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        self.wait_ready().await;
        let path = uri_to_path(&params.text_document_position.text_document.uri)?;

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(rename::rename(index, &params, &path))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        self.wait_ready().await;
        let path = uri_to_path(&params.text_document_position_params.text_document.uri)?;
        let settings = self.coordinator.settings().await;

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(hover::hover(index, &params, &path, &settings))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        self.wait_ready().await;
        let position = &params.text_document_position;
        let path = uri_to_path(&position.text_document.uri)?;
        let Some(line_text) = self.line_text(&path, position.position.line as usize).await else {
            return Ok(None);
        };

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(completion::get_completions(index, &params, &line_text))
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        self.wait_ready().await;
        let path = uri_to_path(&params.text_document.uri)?;

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(codelens::code_lens(index, &path))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        self.wait_ready().await;
        let path = uri_to_path(&params.text_document.uri)?;

        let workspace = self.coordinator.workspace().read().await;
        let index = &workspace.group_for(&path).index;

        Ok(symbol::document_symbol(index, &params, &path))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        self.wait_ready().await;
        let workspace = self.coordinator.workspace().read().await;

        Ok(symbol::workspace_symbol(&workspace, &params))
    }
}
