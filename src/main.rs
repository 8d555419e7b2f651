use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::sync::RwLock;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hcl_index::config::Settings;
use hcl_index::coordinator::IndexCoordinator;
use hcl_index::diagnostics::LogSink;
use hcl_index::index::{FileIndex, Workspace};
use hcl_index::server::Backend;
use hcl_index::syntax::{dump, HclParser, SyntaxParser};

#[derive(Parser)]
#[command(name = "hcl-index")]
#[command(about = "Indexing engine and language server for HCL configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the language server on stdin/stdout (the default)
    #[command(alias = "lsp")]
    Serve,
    /// Print the syntax tree of a file
    Dump { file: PathBuf },
    /// Index a directory and print its sections and references
    Index {
        dir: PathBuf,
        /// Print the file indexes as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries LSP traffic, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Dump { file } => dump_file(&file),
        Command::Index { dir, json } => index_dir(&dir, json).await,
    }
}

async fn serve() -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting language server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

fn dump_file(file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let body = HclParser.parse(&text)?;

    print!("{}", dump(&body));
    Ok(())
}

async fn index_dir(dir: &Path, json: bool) -> anyhow::Result<()> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("failed to open {}", dir.display()))?;
    let settings = Settings::new(&root)?;
    let workspace = Arc::new(RwLock::new(Workspace::default()));
    let coordinator = IndexCoordinator::new(workspace.clone(), settings, Arc::new(LogSink));

    coordinator.crawl(&root).await?;

    let workspace = workspace.read().await;
    let files: Vec<&FileIndex> = workspace.group_for(&root).index.files().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    for file in files {
        let relative = file.file.strip_prefix(&root).unwrap_or(&file.file);
        println!(
            "{} ({} sections, {} references)",
            relative.display(),
            file.sections.len(),
            file.references.len()
        );
        for section in &file.sections {
            println!("  {}", section.id());
        }
        for reference in &file.references {
            let start = reference.location.range.start;
            println!(
                "  -> {} at {}:{}",
                reference.target_id, start.line, start.column
            );
        }
    }

    Ok(())
}
