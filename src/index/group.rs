use std::path::{Path, PathBuf};

use super::WorkspaceIndex;

/// One workspace root and its index. References resolve within a group only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    root: PathBuf,
    pub index: WorkspaceIndex,
}

impl Group {
    pub fn new(root: &Path) -> Group {
        Group {
            root: root.to_path_buf(),
            index: WorkspaceIndex::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// Every open group plus a detached group for files outside all roots.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    groups: Vec<Group>,
    detached: Group,
}

impl Workspace {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Workspace {
        let mut workspace = Workspace::default();
        for root in roots {
            workspace.add_root(&root);
        }
        workspace
    }

    /// Adds an empty group for `root`; a no-op if it is already open.
    pub fn add_root(&mut self, root: &Path) -> &mut Group {
        let position = match self.groups.iter().position(|group| group.root == root) {
            Some(position) => position,
            None => {
                self.groups.push(Group::new(root));
                self.groups.len() - 1
            }
        };
        &mut self.groups[position]
    }

    pub fn remove_root(&mut self, root: &Path) -> Option<Group> {
        let position = self.groups.iter().position(|group| group.root == root)?;
        Some(self.groups.remove(position))
    }

    fn position_for(&self, path: &Path) -> Option<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.contains(path))
            .max_by_key(|(_, group)| group.root.components().count())
            .map(|(i, _)| i)
    }

    /// The group with the deepest root containing `path`, else the detached one.
    pub fn group_for(&self, path: &Path) -> &Group {
        match self.position_for(path) {
            Some(i) => &self.groups[i],
            None => &self.detached,
        }
    }

    pub fn group_for_mut(&mut self, path: &Path) -> &mut Group {
        match self.position_for(path) {
            Some(i) => &mut self.groups[i],
            None => &mut self.detached,
        }
    }

    pub fn group(&self, root: &Path) -> Option<&Group> {
        self.groups.iter().find(|group| group.root == root)
    }

    /// Rooted groups followed by the detached group.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().chain(std::iter::once(&self.detached))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.groups.iter().map(|group| group.root.as_path())
    }
}
