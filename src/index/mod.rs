//! The cross-file declaration and reference index.
//!
//! Data flows one way: a syntax tree is turned into a [`FileIndex`] by
//! [`build_file_index`], file indexes are merged into a [`WorkspaceIndex`]
//! per workspace root ([`Group`]), and queries only ever read the merged view.

mod build;
mod file_index;
mod group;
mod reference;
mod section;
mod workspace;


pub use build::{build_file_index, is_variable_definitions};
pub use file_index::FileIndex;
pub use group::{Group, Workspace};
pub use reference::{Reference, ReferenceKind};
pub use section::{Section, SectionType};
pub use workspace::{Scope, SectionFilter, WorkspaceIndex};
