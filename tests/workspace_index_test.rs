//! Integration tests for crawling and incrementally updating a workspace.
//!
//! These drive the coordinator the way the language server does, against a
//! real directory tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::RwLock;

use hcl_index::config::Settings;
use hcl_index::coordinator::{IndexCoordinator, IndexOutcome};
use hcl_index::diagnostics::LogSink;
use hcl_index::index::{Scope, SectionFilter, Workspace};
use hcl_index::types::Pos;

/// Helper: Create a temporary workspace directory for testing.
///
/// Returns (TempDir, PathBuf) - keep TempDir alive for test duration.
fn create_test_workspace_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("workspace");
    fs::create_dir(&root).expect("Failed to create workspace subdirectory");
    (temp_dir, root)
}

fn coordinator() -> IndexCoordinator {
    IndexCoordinator::new(
        Arc::new(RwLock::new(Workspace::default())),
        Settings::default(),
        Arc::new(LogSink),
    )
}

const VARIABLES: &str = r#"variable "region" {
  default = "eu-west-1"
}

variable "replicas" {}
"#;

const MAIN: &str = r#"module "network" {
  source = "./network"
  region = "${var.region}"
}

output "vpc_id" {
  value = "${module.network.vpc_id}"
}
"#;

// ============================================================================
// Crawl
// ============================================================================

#[tokio::test]
async fn test_crawl_indexes_nested_files_and_skips_hidden() {
    let (_temp_dir, root) = create_test_workspace_dir();
    fs::write(root.join("variables.tf"), VARIABLES).unwrap();
    fs::write(root.join("main.tf"), MAIN).unwrap();
    fs::create_dir_all(root.join("network")).unwrap();
    fs::write(root.join("network/outputs.tf"), "output \"vpc_id\" { value = \"x\" }\n").unwrap();
    fs::create_dir_all(root.join(".terraform/modules")).unwrap();
    fs::write(root.join(".terraform/modules/cached.tf"), "variable \"cached\" {}\n").unwrap();
    fs::write(root.join("README.md"), "# not configuration\n").unwrap();

    let coordinator = coordinator();
    let count = coordinator.crawl(&root).await.unwrap();
    assert_eq!(count, 3);

    let workspace = coordinator.workspace().read().await;
    let index = &workspace.group_for(&root).index;

    let ids: Vec<String> = index
        .query(Scope::AllFiles, Some(SectionFilter::Prefix("variable.")))
        .into_iter()
        .map(|section| section.id())
        .collect();
    assert_eq!(ids, vec!["variable.region", "variable.replicas"]);
    assert!(index.variable("cached").is_none());
}

#[tokio::test]
async fn test_crawl_then_navigate_across_files() {
    let (_temp_dir, root) = create_test_workspace_dir();
    fs::write(root.join("variables.tf"), VARIABLES).unwrap();
    fs::write(root.join("main.tf"), MAIN).unwrap();

    let coordinator = coordinator();
    coordinator.crawl(&root).await.unwrap();

    let workspace = coordinator.workspace().read().await;
    let index = &workspace.group_for(&root).index;
    let main = root.join("main.tf");

    // `var.region` on line 3
    let definition = index.find_definition(&main, Pos::at(3, 16)).unwrap();
    assert_eq!(definition.file, root.join("variables.tf"));
    assert_eq!((definition.range.start.line, definition.range.start.column), (1, 11));

    let references = index.find_references("variable.region");
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].file, main);

    // `module.network` is declared in the same file
    assert!(index.find_definition(&main, Pos::at(7, 16)).is_some());
}

// ============================================================================
// Incremental updates
// ============================================================================

#[tokio::test]
async fn test_change_on_disk_updates_references() {
    let (_temp_dir, root) = create_test_workspace_dir();
    fs::write(root.join("variables.tf"), VARIABLES).unwrap();
    fs::write(root.join("main.tf"), MAIN).unwrap();

    let coordinator = coordinator();
    coordinator.crawl(&root).await.unwrap();

    fs::write(
        root.join("main.tf"),
        "output \"count\" { value = \"${var.replicas}\" }\n",
    )
    .unwrap();
    let outcome = coordinator.on_changed(&root.join("main.tf")).await;
    assert_eq!(outcome, Some(IndexOutcome::Indexed));

    let workspace = coordinator.workspace().read().await;
    let index = &workspace.group_for(&root).index;
    assert!(index.find_references("variable.region").is_empty());
    assert_eq!(index.find_references("variable.replicas").len(), 1);
    assert!(index.section("module.network").is_none());
}

#[tokio::test]
async fn test_delete_removes_declarations() {
    let (_temp_dir, root) = create_test_workspace_dir();
    fs::write(root.join("variables.tf"), VARIABLES).unwrap();
    fs::write(root.join("main.tf"), MAIN).unwrap();

    let coordinator = coordinator();
    coordinator.crawl(&root).await.unwrap();

    fs::remove_file(root.join("variables.tf")).unwrap();
    coordinator.on_deleted(&root.join("variables.tf")).await;

    let workspace = coordinator.workspace().read().await;
    let index = &workspace.group_for(&root).index;
    assert!(index.variable("region").is_none());
    // the reference survives, unresolved
    assert_eq!(index.references_to("variable.region").len(), 0);
    let main = index.file(Path::new(&root.join("main.tf"))).unwrap();
    assert_eq!(main.references[0].target_id, "variable.region");
}

#[tokio::test]
async fn test_broken_file_keeps_previous_index() {
    let (_temp_dir, root) = create_test_workspace_dir();
    fs::write(root.join("variables.tf"), VARIABLES).unwrap();

    let coordinator = coordinator();
    coordinator.crawl(&root).await.unwrap();

    let path = root.join("variables.tf");
    let outcome = coordinator.index_text(&path, "variable \"region\" {\n").await;
    assert_eq!(outcome, IndexOutcome::Failed);

    let workspace = coordinator.workspace().read().await;
    let index = &workspace.group_for(&root).index;
    assert!(index.variable("region").is_some());
    assert_eq!(index.diagnostics(&path).len(), 1);
}
