use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use itertools::Itertools;

use super::{FileIndex, Reference, Section, SectionType};
use crate::syntax::ParseError;
use crate::types::{Location, Pos};

/// Which files a query searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    AllFiles,
    File(&'a Path),
}

/// Filter on section ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionFilter<'a> {
    Exact(&'a str),
    Prefix(&'a str),
}

impl SectionFilter<'_> {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            SectionFilter::Exact(exact) => id == *exact,
            SectionFilter::Prefix(prefix) => id.starts_with(prefix),
        }
    }
}

/// Points at one entry of a file's sections or references.
type Slot = (PathBuf, usize);

/// All file indexes of one group plus the lookup maps derived from them.
///
/// Files are kept ordered by path and the derived maps are rebuilt from
/// scratch on every mutation, so the final state only depends on the set of
/// file indexes, never on the order they arrived in. When several files
/// declare the same id the one with the greatest path wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceIndex {
    files: BTreeMap<PathBuf, FileIndex>,
    sections_by_id: HashMap<String, Slot>,
    variables_by_name: HashMap<String, Slot>,
    outputs_by_name: HashMap<String, Slot>,
    /// Only references whose target resolves.
    references_by_target: HashMap<String, Vec<Slot>>,
    references_by_file: HashMap<PathBuf, Vec<usize>>,
}

impl WorkspaceIndex {
    pub fn new() -> WorkspaceIndex {
        WorkspaceIndex::default()
    }

    /// Replaces the index of `file` and rebuilds the derived maps.
    pub fn update(&mut self, file: &Path, file_index: FileIndex) {
        self.files.insert(file.to_path_buf(), file_index);
        self.rebuild();
    }

    /// Replaces several file indexes with a single rebuild.
    pub fn update_many(&mut self, file_indexes: impl IntoIterator<Item = FileIndex>) {
        for file_index in file_indexes {
            self.files.insert(file_index.file.clone(), file_index);
        }
        self.rebuild();
    }

    /// Returns the removed index, if the file was known.
    pub fn remove(&mut self, file: &Path) -> Option<FileIndex> {
        let removed = self.files.remove(file);
        if removed.is_some() {
            self.rebuild();
        }
        removed
    }

    /// Records a failed parse. A previously indexed file keeps its sections
    /// and references; an unknown file gets an empty index.
    pub fn record_failure(&mut self, file: &Path, diagnostics: Vec<ParseError>) {
        match self.files.get_mut(file) {
            Some(existing) => existing.diagnostics = diagnostics,
            None => {
                let mut file_index = FileIndex::empty(file);
                file_index.diagnostics = diagnostics;
                self.update(file, file_index);
            }
        }
    }

    fn rebuild(&mut self) {
        self.sections_by_id.clear();
        self.variables_by_name.clear();
        self.outputs_by_name.clear();
        self.references_by_target.clear();
        self.references_by_file.clear();

        for (path, file_index) in &self.files {
            for (i, section) in file_index.sections.iter().enumerate() {
                let slot = (path.clone(), i);
                match section.section_type {
                    SectionType::Variable => {
                        self.variables_by_name
                            .insert(section.name.clone(), slot.clone());
                    }
                    SectionType::Output => {
                        self.outputs_by_name
                            .insert(section.name.clone(), slot.clone());
                    }
                    _ => {}
                }
                self.sections_by_id.insert(section.id(), slot);
            }
        }

        let mut by_target: HashMap<String, Vec<Slot>> = HashMap::new();
        for (path, file_index) in &self.files {
            for (i, reference) in file_index.references.iter().enumerate() {
                if self.resolve(&reference.target_id).is_some() {
                    by_target
                        .entry(reference.target_id.clone())
                        .or_default()
                        .push((path.clone(), i));
                }
            }
            self.references_by_file
                .insert(path.clone(), (0..file_index.references.len()).collect());
        }
        self.references_by_target = by_target;
    }

    fn get_section(&self, (path, i): &Slot) -> Option<&Section> {
        self.files.get(path)?.sections.get(*i)
    }

    fn get_reference(&self, (path, i): &Slot) -> Option<&Reference> {
        self.files.get(path)?.references.get(*i)
    }

    /// The section a target id resolves to. Variables and outputs resolve by
    /// name, everything else by id.
    pub fn resolve(&self, target_id: &str) -> Option<&Section> {
        let slot = match target_id.split_once('.') {
            Some(("variable", name)) => self.variables_by_name.get(name),
            Some(("output", name)) => self.outputs_by_name.get(name),
            _ => self.sections_by_id.get(target_id),
        }?;
        self.get_section(slot)
    }

    /// Same as [`WorkspaceIndex::resolve`].
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.resolve(id)
    }

    pub fn variable(&self, name: &str) -> Option<&Section> {
        self.get_section(self.variables_by_name.get(name)?)
    }

    pub fn output(&self, name: &str) -> Option<&Section> {
        self.get_section(self.outputs_by_name.get(name)?)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables_by_name.keys().map(String::as_str).sorted()
    }

    pub fn file(&self, file: &Path) -> Option<&FileIndex> {
        self.files.get(file)
    }

    /// Files in path order.
    pub fn files(&self) -> impl Iterator<Item = &FileIndex> {
        self.files.values()
    }

    pub fn contains(&self, file: &Path) -> bool {
        self.files.contains_key(file)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sections ordered by file path, then declaration order.
    ///
    /// Path order stands in for the order files were added: it is the same
    /// whichever sequence of updates produced the index, so an incrementally
    /// maintained index and a fresh crawl of the same files answer alike.
    pub fn query(&self, scope: Scope, filter: Option<SectionFilter>) -> Vec<&Section> {
        let files: Vec<&FileIndex> = match scope {
            Scope::AllFiles => self.files.values().collect(),
            Scope::File(file) => self.files.get(file).into_iter().collect(),
        };

        files
            .into_iter()
            .flat_map(|file_index| file_index.sections.iter())
            .filter(|section| filter.map_or(true, |filter| filter.matches(&section.id())))
            .collect()
    }

    pub fn reference_at(&self, file: &Path, pos: Pos) -> Option<&Reference> {
        let file_index = self.files.get(file)?;
        self.references_by_file
            .get(file)?
            .iter()
            .filter_map(|i| file_index.references.get(*i))
            .find(|reference| reference.location.range.contains(pos))
    }

    pub fn section_at_name(&self, file: &Path, pos: Pos) -> Option<&Section> {
        self.files.get(file)?.section_at_name(pos)
    }

    /// The name location of whatever the reference under `pos` points at.
    pub fn find_definition(&self, file: &Path, pos: Pos) -> Option<Location> {
        let reference = self.reference_at(file, pos)?;
        let section = self.resolve(&reference.target_id)?;
        Some(section.name_location.clone())
    }

    /// References to a resolvable target, in file path then source order.
    pub fn references_to(&self, target_id: &str) -> Vec<&Reference> {
        self.references_by_target
            .get(target_id)
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|slot| self.get_reference(slot))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn find_references(&self, target_id: &str) -> Vec<Location> {
        self.references_to(target_id)
            .into_iter()
            .map(|reference| reference.location.clone())
            .collect()
    }

    pub fn diagnostics(&self, file: &Path) -> &[ParseError] {
        self.files
            .get(file)
            .map(|file_index| file_index.diagnostics.as_slice())
            .unwrap_or_default()
    }
}
