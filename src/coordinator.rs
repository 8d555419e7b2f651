//! Keeps the workspace index in step with the files on disk and in the editor.
//!
//! Every event is treated as "reindex as of now": creation and change events
//! reread the file, deletes drop it, and live edits go through a per-file
//! debounce whose pending task is aborted and replaced on every keystroke.
//! A file with unsaved editor changes is never reindexed from disk.
//!
//! Each event bumps a per-file generation. Work captures the generation it
//! started under and is dropped, instead of applied, if a later event for the
//! same file has arrived by the time its result reaches the index.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use itertools::Itertools;
use rayon::prelude::*;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::diagnostics::DiagnosticsSink;
use crate::index::{FileIndex, Workspace};
use crate::syntax::{HclParser, ParseError, SyntaxParser};

/// Where a file is in its index lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileState {
    Unindexed,
    Indexing,
    Indexed,
    /// Edited in the editor, reindex pending
    Stale,
    Removed,
}

/// What one indexing attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Indexed,
    /// Parse failed; the previous index was kept and diagnostics published.
    Failed,
    Excluded,
    Disabled,
    /// A later event for the file arrived first; the result was dropped.
    Superseded,
}

pub fn is_config_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("tf" | "tfvars")
    )
}

/// Compiles exclusion globs, skipping (and logging) invalid ones.
pub fn exclusion_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => warn!(%pattern, %err, "ignoring invalid exclude pattern"),
        }
    }
    builder.build().unwrap_or_else(|err| {
        warn!(%err, "failed to compile exclude patterns");
        GlobSet::empty()
    })
}

/// Whether `path`, taken relative to `root`, matches an exclusion.
pub fn is_excluded(exclude: &GlobSet, root: &Path, path: &Path) -> bool {
    if exclude.is_empty() {
        return false;
    }
    pathdiff::diff_paths(path, root).is_some_and(|relative| exclude.is_match(relative))
}

#[derive(Clone)]
pub struct IndexCoordinator {
    workspace: Arc<RwLock<Workspace>>,
    settings: Arc<RwLock<Settings>>,
    parser: Arc<dyn SyntaxParser>,
    sink: Arc<dyn DiagnosticsSink>,
    pending: Arc<Mutex<HashMap<PathBuf, JoinHandle<()>>>>,
    states: Arc<Mutex<HashMap<PathBuf, FileState>>>,
    dirty: Arc<Mutex<HashSet<PathBuf>>>,
    generations: Arc<Mutex<HashMap<PathBuf, u64>>>,
}

impl IndexCoordinator {
    pub fn new(
        workspace: Arc<RwLock<Workspace>>,
        settings: Settings,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> IndexCoordinator {
        IndexCoordinator::with_parser(workspace, settings, Arc::new(HclParser), sink)
    }

    pub fn with_parser(
        workspace: Arc<RwLock<Workspace>>,
        settings: Settings,
        parser: Arc<dyn SyntaxParser>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> IndexCoordinator {
        IndexCoordinator {
            workspace,
            settings: Arc::new(RwLock::new(settings)),
            parser,
            sink,
            pending: Default::default(),
            states: Default::default(),
            dirty: Default::default(),
            generations: Default::default(),
        }
    }

    pub fn workspace(&self) -> &Arc<RwLock<Workspace>> {
        &self.workspace
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// New settings apply to the next event; nothing is reindexed.
    pub async fn update_settings(&self, settings: Settings) {
        debug!(?settings, "settings updated");
        *self.settings.write().await = settings;
    }

    pub async fn state(&self, path: &Path) -> FileState {
        self.states
            .lock()
            .await
            .get(path)
            .copied()
            .unwrap_or(FileState::Unindexed)
    }

    async fn set_state(&self, path: &Path, state: FileState) {
        self.states.lock().await.insert(path.to_path_buf(), state);
    }

    pub async fn is_dirty(&self, path: &Path) -> bool {
        self.dirty.lock().await.contains(path)
    }

    /// Starts a new generation for `path` and returns it.
    async fn bump(&self, path: &Path) -> u64 {
        let mut generations = self.generations.lock().await;
        let generation = generations.entry(path.to_path_buf()).or_default();
        *generation += 1;
        *generation
    }

    async fn is_current(&self, path: &Path, generation: u64) -> bool {
        self.generations.lock().await.get(path).copied().unwrap_or(0) == generation
    }

    async fn cancel_pending(&self, path: &Path) {
        if let Some(handle) = self.pending.lock().await.remove(path) {
            handle.abort();
            debug!(path = %path.display(), "cancelled pending reindex");
        }
    }

    async fn excluded(&self, settings: &Settings, path: &Path) -> bool {
        if !is_config_file(path) {
            return true;
        }
        let root = self.workspace.read().await.group_for(path).root().to_path_buf();
        is_excluded(&exclusion_set(&settings.exclude), &root, path)
    }

    /// Parses `text` as the content of `path` and replaces its index.
    pub async fn index_text(&self, path: &Path, text: &str) -> IndexOutcome {
        let generation = self.bump(path).await;
        self.apply_text(path, text, generation).await
    }

    async fn apply_text(&self, path: &Path, text: &str, generation: u64) -> IndexOutcome {
        let settings = self.settings().await;
        if !settings.indexing_enabled {
            return IndexOutcome::Disabled;
        }
        if self.excluded(&settings, path).await {
            debug!(path = %path.display(), "skipping excluded file");
            return IndexOutcome::Excluded;
        }

        self.set_state(path, FileState::Indexing).await;
        let parsed = FileIndex::from_source(self.parser.as_ref(), path, text);

        let (outcome, diagnostics) = {
            let mut workspace = self.workspace.write().await;
            // checked under the write lock so no newer result lands in between
            if !self.is_current(path, generation).await {
                debug!(path = %path.display(), generation, "dropping superseded reindex");
                return IndexOutcome::Superseded;
            }
            let index = &mut workspace.group_for_mut(path).index;
            match parsed {
                Ok(file_index) => {
                    let diagnostics = file_index.diagnostics.clone();
                    index.update(path, file_index);
                    (IndexOutcome::Indexed, diagnostics)
                }
                Err(err) => {
                    debug!(path = %path.display(), %err, "parse failed, keeping previous index");
                    index.record_failure(path, vec![err.clone()]);
                    (IndexOutcome::Failed, vec![err])
                }
            }
        };

        self.sink.publish(path, diagnostics);
        self.set_state(path, FileState::Indexed).await;
        outcome
    }

    /// Reads `path` from disk and indexes it. Returns `None` when the file has
    /// unsaved editor changes or cannot be read.
    pub async fn index_path(&self, path: &Path) -> Option<IndexOutcome> {
        if self.is_dirty(path).await {
            debug!(path = %path.display(), "skipping reindex of dirty document");
            return None;
        }

        let generation = self.bump(path).await;
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Some(self.apply_text(path, &text, generation).await),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read file");
                None
            }
        }
    }

    pub async fn on_created(&self, path: &Path) -> Option<IndexOutcome> {
        self.index_path(path).await
    }

    pub async fn on_changed(&self, path: &Path) -> Option<IndexOutcome> {
        self.index_path(path).await
    }

    pub async fn on_deleted(&self, path: &Path) {
        self.bump(path).await;
        self.cancel_pending(path).await;
        self.dirty.lock().await.remove(path);

        let removed = self
            .workspace
            .write()
            .await
            .group_for_mut(path)
            .index
            .remove(path);
        if removed.is_some() {
            debug!(path = %path.display(), "removed from index");
        }

        self.sink.publish(path, Vec::new());
        self.set_state(path, FileState::Removed).await;
    }

    /// An unsaved edit in the editor. With live indexing on, `text` is indexed
    /// once no further edit arrives for the configured delay.
    pub async fn on_edit(&self, path: &Path, text: String) {
        self.dirty.lock().await.insert(path.to_path_buf());
        let generation = self.bump(path).await;

        let settings = self.settings().await;
        if !settings.indexing_enabled || !settings.live_indexing {
            return;
        }
        self.set_state(path, FileState::Stale).await;

        let delay = settings.debounce();
        let this = self.clone();
        let owned = path.to_path_buf();

        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.remove(path) {
            handle.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.pending.lock().await.remove(&owned);
            this.apply_text(&owned, &text, generation).await;
        });
        pending.insert(path.to_path_buf(), handle);
    }

    /// A save. `text` is the saved content when the editor sends it.
    pub async fn on_save(&self, path: &Path, text: Option<String>) -> Option<IndexOutcome> {
        self.dirty.lock().await.remove(path);
        self.bump(path).await;
        self.cancel_pending(path).await;

        if !self.settings().await.index_on_save {
            return None;
        }
        match text {
            Some(text) => Some(self.index_text(path, &text).await),
            None => self.index_path(path).await,
        }
    }

    /// A closed document reverts to what is on disk.
    pub async fn on_close(&self, path: &Path) -> Option<IndexOutcome> {
        self.dirty.lock().await.remove(path);
        self.bump(path).await;
        self.cancel_pending(path).await;
        self.index_path(path).await
    }

    /// Indexes every configuration file under `root` into its group, parsing
    /// in parallel and applying the results in one batch. Returns the number
    /// of files indexed.
    pub async fn crawl(&self, root: &Path) -> anyhow::Result<usize> {
        let settings = self.settings().await;
        self.workspace.write().await.add_root(root);
        if !settings.indexing_enabled {
            return Ok(0);
        }

        let parser = self.parser.clone();
        let owned_root = root.to_path_buf();
        let exclude = exclusion_set(&settings.exclude);
        let started = self.generations.lock().await.clone();
        let results = tokio::task::spawn_blocking(move || {
            crawl_dir(&owned_root, &exclude, parser.as_ref())
        })
        .await?;

        // held until the batch is applied so no per-file event interleaves
        let mut workspace = self.workspace.write().await;
        let dirty = self.dirty.lock().await.clone();
        let current = self.generations.lock().await.clone();
        let (indexed, failed): (Vec<_>, Vec<_>) = results
            .into_iter()
            .filter(|(path, _)| !dirty.contains(path))
            .filter(|(path, _)| current.get(path) == started.get(path))
            .partition(|(_, result)| result.is_ok());

        let indexed: Vec<FileIndex> = indexed
            .into_iter()
            .filter_map(|(_, result)| result.ok())
            .collect();
        let failed: Vec<(PathBuf, ParseError)> = failed
            .into_iter()
            .filter_map(|(path, result)| result.err().map(|err| (path, err)))
            .collect();

        let count = indexed.len();
        let mut paths = indexed.iter().map(|file| file.file.clone()).collect_vec();
        let mut published = Vec::new();
        {
            let group = workspace.add_root(root);
            for file_index in &indexed {
                if !file_index.diagnostics.is_empty() {
                    published.push((file_index.file.clone(), file_index.diagnostics.clone()));
                }
            }
            group.index.update_many(indexed);
            for (path, err) in failed {
                group.index.record_failure(&path, vec![err.clone()]);
                published.push((path.clone(), vec![err]));
                paths.push(path);
            }
        }
        drop(workspace);

        for (path, errors) in published {
            self.sink.publish(&path, errors);
        }
        {
            let mut states = self.states.lock().await;
            for path in paths {
                states.insert(path, FileState::Indexed);
            }
        }

        info!(root = %root.display(), files = count, "indexed workspace");
        Ok(count)
    }

    /// Drops a workspace root and everything indexed under it.
    pub async fn remove_root(&self, root: &Path) {
        let Some(group) = self.workspace.write().await.remove_root(root) else {
            return;
        };

        for file in group.index.files() {
            self.cancel_pending(&file.file).await;
            self.sink.publish(&file.file, Vec::new());
        }
        info!(root = %root.display(), "removed workspace root");
    }
}

type CrawlResult = (PathBuf, Result<FileIndex, ParseError>);

fn crawl_dir(root: &Path, exclude: &GlobSet, parser: &dyn SyntaxParser) -> Vec<CrawlResult> {
    let paths = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .map(|name| name.starts_with('.'))
                    .unwrap_or(false)
        })
        .flatten()
        .filter(|entry| entry.file_type().is_file() && is_config_file(entry.path()))
        .filter(|entry| !is_excluded(exclude, root, entry.path()))
        .map(|entry| entry.into_path())
        .collect_vec();

    paths
        .par_iter()
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(text) => Some((path.clone(), FileIndex::from_source(parser, path, &text))),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read file");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::index::{Scope, SectionFilter};
    use crate::test_utils::{create_test_workspace_dir, RecordingSink};

    fn coordinator(root: &Path, settings: Settings) -> (IndexCoordinator, Arc<RecordingSink>) {
        let workspace = Arc::new(RwLock::new(Workspace::new([root.to_path_buf()])));
        let sink = Arc::new(RecordingSink::default());
        (IndexCoordinator::new(workspace, settings, sink.clone()), sink)
    }

    async fn ids(coordinator: &IndexCoordinator, path: &Path) -> Vec<String> {
        let workspace = coordinator.workspace().read().await;
        workspace
            .group_for(path)
            .index
            .query(Scope::AllFiles, None)
            .iter()
            .map(|s| s.id())
            .collect()
    }

    /// Test: only the last edit inside the debounce window gets indexed.
    #[tokio::test(start_paused = true)]
    async fn test_live_edits_are_debounced() {
        let root = Path::new("/ws");
        let path = root.join("main.tf");
        let (coordinator, _sink) = coordinator(root, Settings::default());

        coordinator.on_edit(&path, "variable \"a\" {}".into()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        coordinator.on_edit(&path, "variable \"b\" {}".into()).await;

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(ids(&coordinator, &path).await.is_empty());
        assert_eq!(coordinator.state(&path).await, FileState::Stale);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ids(&coordinator, &path).await, vec!["variable.b"]);
        assert_eq!(coordinator.state(&path).await, FileState::Indexed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_indexing_disabled() {
        let root = Path::new("/ws");
        let path = root.join("main.tf");
        let settings = Settings {
            live_indexing: false,
            ..Settings::default()
        };
        let (coordinator, _sink) = coordinator(root, settings);

        coordinator.on_edit(&path, "variable \"a\" {}".into()).await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(ids(&coordinator, &path).await.is_empty());
        assert!(coordinator.is_dirty(&path).await);
    }

    /// Test: a save cancels the pending live reindex and indexes right away.
    #[tokio::test(start_paused = true)]
    async fn test_save_indexes_immediately() {
        let root = Path::new("/ws");
        let path = root.join("main.tf");
        let (coordinator, _sink) = coordinator(root, Settings::default());

        coordinator.on_edit(&path, "variable \"draft\" {}".into()).await;
        let outcome = coordinator
            .on_save(&path, Some("variable \"saved\" {}".into()))
            .await;

        assert_eq!(outcome, Some(IndexOutcome::Indexed));
        assert!(!coordinator.is_dirty(&path).await);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ids(&coordinator, &path).await, vec!["variable.saved"]);
    }

    /// Parses normally, but holds any text containing "draft" until released.
    struct GatedParser {
        started: std::sync::Barrier,
        release: std::sync::Barrier,
    }

    impl GatedParser {
        fn new() -> Arc<GatedParser> {
            Arc::new(GatedParser {
                started: std::sync::Barrier::new(2),
                release: std::sync::Barrier::new(2),
            })
        }

        async fn wait_started(self: &Arc<Self>) {
            let this = self.clone();
            tokio::task::spawn_blocking(move || this.started.wait())
                .await
                .unwrap();
        }

        async fn release(self: &Arc<Self>) {
            let this = self.clone();
            tokio::task::spawn_blocking(move || this.release.wait())
                .await
                .unwrap();
        }
    }

    impl SyntaxParser for GatedParser {
        fn parse(&self, text: &str) -> Result<crate::syntax::Body, ParseError> {
            if text.contains("draft") {
                self.started.wait();
                self.release.wait();
            }
            HclParser.parse(text)
        }
    }

    fn gated_coordinator(root: &Path, parser: Arc<GatedParser>) -> IndexCoordinator {
        let workspace = Arc::new(RwLock::new(Workspace::new([root.to_path_buf()])));
        let settings = Settings {
            live_indexing_delay: 10,
            ..Settings::default()
        };
        IndexCoordinator::with_parser(workspace, settings, parser, Arc::new(RecordingSink::default()))
    }

    /// Test: a save during an in-flight live reindex wins over the older draft.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_save_wins_over_inflight_live_reindex() {
        let root = Path::new("/ws");
        let path = root.join("main.tf");
        let parser = GatedParser::new();
        let coordinator = gated_coordinator(root, parser.clone());

        coordinator.on_edit(&path, "variable \"draft\" {}".into()).await;
        // the debounce fired and the draft is being parsed
        parser.wait_started().await;

        let outcome = coordinator
            .on_save(&path, Some("variable \"saved\" {}".into()))
            .await;
        assert_eq!(outcome, Some(IndexOutcome::Indexed));

        parser.release().await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(ids(&coordinator, &path).await, vec!["variable.saved"]);
        assert_eq!(coordinator.state(&path).await, FileState::Indexed);
    }

    /// Test: a change applied while the crawl is parsing is not overwritten.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_crawl_drops_files_changed_meanwhile() {
        let (_temp_dir, root) = create_test_workspace_dir();
        let path = root.join("main.tf");
        std::fs::write(&path, "variable \"draft\" {}").unwrap();
        std::fs::write(root.join("other.tf"), "output \"o\" {}").unwrap();
        let parser = GatedParser::new();
        let coordinator = gated_coordinator(&root, parser.clone());

        let crawl = {
            let coordinator = coordinator.clone();
            let root = root.clone();
            tokio::spawn(async move { coordinator.crawl(&root).await })
        };
        parser.wait_started().await;

        let outcome = coordinator.index_text(&path, "variable \"saved\" {}").await;
        assert_eq!(outcome, IndexOutcome::Indexed);

        parser.release().await;
        let count = crawl.await.unwrap().unwrap();

        assert_eq!(count, 1);
        assert_eq!(ids(&coordinator, &path).await, vec!["variable.saved", "output.o"]);
    }

    /// Test: transient syntax errors keep the last good index.
    #[tokio::test]
    async fn test_parse_failure_keeps_previous_index() {
        let root = Path::new("/ws");
        let path = root.join("main.tf");
        let (coordinator, sink) = coordinator(root, Settings::default());

        let outcome = coordinator.index_text(&path, "variable \"a\" {}").await;
        assert_eq!(outcome, IndexOutcome::Indexed);
        assert_eq!(sink.last_for(&path), Some(vec![]));

        let outcome = coordinator.index_text(&path, "variable \"a\" {").await;
        assert_eq!(outcome, IndexOutcome::Failed);
        assert_eq!(ids(&coordinator, &path).await, vec!["variable.a"]);
        assert_eq!(sink.last_for(&path).map(|errors| errors.len()), Some(1));

        coordinator.index_text(&path, "variable \"b\" {}").await;
        assert_eq!(ids(&coordinator, &path).await, vec!["variable.b"]);
        assert_eq!(sink.last_for(&path), Some(vec![]));
    }

    /// Test: a malformed new file yields no sections and one diagnostic.
    #[tokio::test]
    async fn test_malformed_file() {
        let root = Path::new("/ws");
        let path = root.join("bad.tf");
        let (coordinator, sink) = coordinator(root, Settings::default());

        let outcome = coordinator.index_text(&path, "}}").await;

        assert_eq!(outcome, IndexOutcome::Failed);
        assert!(ids(&coordinator, &path).await.is_empty());
        assert_eq!(sink.last_for(&path).map(|errors| errors.len()), Some(1));
    }

    #[tokio::test]
    async fn test_disabled_and_excluded() {
        let root = Path::new("/ws");
        let settings = Settings {
            exclude: vec!["vendor/**".into()],
            ..Settings::default()
        };
        let (coordinator, _sink) = coordinator(root, settings.clone());

        assert_eq!(
            coordinator.index_text(&root.join("vendor/x.tf"), "").await,
            IndexOutcome::Excluded
        );
        assert_eq!(
            coordinator.index_text(&root.join("README.md"), "").await,
            IndexOutcome::Excluded
        );

        coordinator
            .update_settings(Settings {
                indexing_enabled: false,
                ..settings
            })
            .await;
        assert_eq!(
            coordinator.index_text(&root.join("main.tf"), "").await,
            IndexOutcome::Disabled
        );
    }

    #[tokio::test]
    async fn test_delete_removes_and_clears_diagnostics() {
        let root = Path::new("/ws");
        let path = root.join("main.tf");
        let (coordinator, sink) = coordinator(root, Settings::default());

        coordinator.index_text(&path, "output \"o\" {}").await;
        coordinator.on_deleted(&path).await;

        assert!(ids(&coordinator, &path).await.is_empty());
        assert_eq!(sink.last_for(&path), Some(vec![]));
        assert_eq!(coordinator.state(&path).await, FileState::Removed);

        // deleting twice is harmless
        coordinator.on_deleted(&path).await;
    }

    /// Test: change events do not overwrite unsaved editor content.
    #[tokio::test]
    async fn test_change_event_skips_dirty_document() {
        let (_temp_dir, root) = create_test_workspace_dir();
        let path = root.join("main.tf");
        std::fs::write(&path, "variable \"on_disk\" {}").unwrap();
        let settings = Settings {
            live_indexing: false,
            ..Settings::default()
        };
        let (coordinator, _sink) = coordinator(&root, settings);

        assert_eq!(coordinator.on_created(&path).await, Some(IndexOutcome::Indexed));
        coordinator.on_edit(&path, "variable \"typed\" {}".into()).await;
        assert_eq!(coordinator.on_changed(&path).await, None);

        assert_eq!(coordinator.on_close(&path).await, Some(IndexOutcome::Indexed));
        assert_eq!(ids(&coordinator, &path).await, vec!["variable.on_disk"]);
    }

    #[tokio::test]
    async fn test_unreadable_file_keeps_state() {
        let (_temp_dir, root) = create_test_workspace_dir();
        let path = root.join("missing.tf");
        let (coordinator, _sink) = coordinator(&root, Settings::default());

        assert_eq!(coordinator.on_changed(&path).await, None);
        assert_eq!(coordinator.state(&path).await, FileState::Unindexed);
    }

    /// Test: the crawl skips hidden and excluded files and reports failures.
    #[tokio::test]
    async fn test_crawl() {
        let (_temp_dir, root) = create_test_workspace_dir();
        std::fs::create_dir_all(root.join(".terraform")).unwrap();
        std::fs::create_dir_all(root.join("vendor")).unwrap();
        std::fs::create_dir_all(root.join("modules/net")).unwrap();
        std::fs::write(root.join("main.tf"), "variable \"region\" {}").unwrap();
        std::fs::write(root.join("prod.tfvars"), "region = \"eu\"").unwrap();
        std::fs::write(root.join("modules/net/main.tf"), "output \"id\" {}").unwrap();
        std::fs::write(root.join(".terraform/cached.tf"), "variable \"hidden\" {}").unwrap();
        std::fs::write(root.join("vendor/lib.tf"), "variable \"vendored\" {}").unwrap();
        std::fs::write(root.join("broken.tf"), "}}").unwrap();
        std::fs::write(root.join("notes.md"), "# notes").unwrap();

        let settings = Settings {
            exclude: vec!["vendor/**".into()],
            ..Settings::default()
        };
        let (coordinator, sink) = coordinator(&root, settings);

        let count = coordinator.crawl(&root).await.unwrap();
        assert_eq!(count, 3);

        let workspace = coordinator.workspace().read().await;
        let index = &workspace.group_for(&root.join("main.tf")).index;
        assert_eq!(
            index
                .query(Scope::AllFiles, Some(SectionFilter::Prefix("variable.")))
                .len(),
            1
        );
        assert_eq!(index.find_references("variable.region").len(), 1);
        assert_eq!(index.diagnostics(&root.join("broken.tf")).len(), 1);
        drop(workspace);

        assert_eq!(sink.published().len(), 1);
        assert_eq!(
            coordinator.state(&root.join("broken.tf")).await,
            FileState::Indexed
        );
    }

    #[tokio::test]
    async fn test_remove_root() {
        let (_temp_dir, root) = create_test_workspace_dir();
        std::fs::write(root.join("main.tf"), "variable \"region\" {}").unwrap();
        let (coordinator, sink) = coordinator(&root, Settings::default());

        coordinator.crawl(&root).await.unwrap();
        coordinator.remove_root(&root).await;

        assert!(coordinator.workspace().read().await.group(&root).is_none());
        assert_eq!(sink.last_for(&root.join("main.tf")), Some(vec![]));
    }

    #[test]
    fn test_exclusion_is_relative_to_root() {
        let exclude = exclusion_set(&["modules/*/test.tf".into(), "[".into()]);
        let root = Path::new("/ws");

        assert!(is_excluded(&exclude, root, Path::new("/ws/modules/a/test.tf")));
        assert!(!is_excluded(&exclude, root, Path::new("/ws/test.tf")));
        assert!(!is_excluded(&GlobSet::empty(), root, Path::new("/ws/x.tf")));
    }
}
