//! hcl-index: an indexing engine and language server for HCL infrastructure
//! configuration.
//!
//! # Overview
//!
//! The crate keeps a live, queryable index of the declarations and
//! cross-references in a workspace of `.tf` and `.tfvars` files:
//!
//! - **Indexing**: every file is parsed into a syntax tree and reduced to its
//!   sections (`variable`, `output`, `locals` entries, `module`, `provider`,
//!   `resource`, `data`) and the references its interpolations make
//! - **Queries**: definitions, references, hover values, completion candidates
//!   and symbols over a whole workspace root
//! - **Incremental updates**: editor and filesystem events reindex single
//!   files, with debounced live indexing of unsaved edits
//!
//! # Architecture
//!
//! - [`syntax`]: lexer, parser, tree walker and value rendering
//! - [`index`]: per-file and per-workspace indexes
//! - [`coordinator`]: event handling on top of the index
//! - [`server`]: the `tower-lsp` backend
//! - [`config`]: layered settings
//!
//! # Usage
//!
//! ```ignore
//! use hcl_index::index::{FileIndex, WorkspaceIndex};
//! use hcl_index::syntax::HclParser;
//!
//! let file = FileIndex::from_source(&HclParser, path, &text)?;
//! let mut index = WorkspaceIndex::new();
//! index.update(path, file);
//! let definition = index.find_definition(path, pos);
//! ```

// Core modules - syntax tree and index
pub mod index;
pub mod syntax;
pub mod types;

// Indexing pipeline
pub mod coordinator;
pub mod diagnostics;

// LSP feature modules
pub mod codelens;
pub mod completion;
pub mod gotodef;
pub mod hover;
pub mod references;
pub mod rename;
pub mod symbol;

pub mod server;

// Configuration
pub mod config;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
