//! Datasets and the store seam
//!
//! A [`Dataset`] is an ordered collection of named [`GriddedField`] variables,
//! the in-memory image of one run's input file. The on-disk container format,
//! coordinate decoding and file globbing belong to a collaborator I/O layer
//! behind the [`DatasetStore`] trait; [`MemoryStore`] is the implementation
//! used in tests.

use crate::errors::{SlcError, SlcResult};
use crate::field::GriddedField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named collection of gridded variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    variables: Vec<GriddedField>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable to the dataset.
    ///
    /// Panics if a variable with the same name already exists.
    pub fn add_variable(&mut self, field: GriddedField) {
        assert!(
            self.get(field.name()).is_none(),
            "variable {} already exists",
            field.name()
        );
        self.variables.push(field);
    }

    pub fn get(&self, name: &str) -> Option<&GriddedField> {
        self.variables.iter().find(|f| f.name() == name)
    }

    /// Clone a variable out of the dataset, failing if it is absent.
    pub fn extract(&self, name: &str) -> SlcResult<GriddedField> {
        self.get(name)
            .cloned()
            .ok_or_else(|| SlcError::VariableNotFound {
                name: name.to_string(),
            })
    }

    /// Whether `name` occurs as a variable name or as an axis of any variable.
    pub fn contains_name(&self, name: &str) -> bool {
        self.variables
            .iter()
            .any(|f| f.name() == name || f.has_dim(name))
    }

    /// Rename a variable and/or axis throughout the dataset.
    pub fn rename(&mut self, from: &str, to: &str) {
        for field in &mut self.variables {
            if field.name() == from {
                field.rename(to);
            }
            field.rename_dim(from, to);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GriddedField> {
        self.variables.iter()
    }
}

/// The collaborator seam to persisted gridded data.
///
/// Implementations own the container format; the core only relies on
/// `list` returning lexicographically sorted paths with a netCDF-like
/// extension, and `open` producing a [`Dataset`] promptly or failing.
pub trait DatasetStore {
    /// All dataset paths directly under `dir`, sorted lexicographically.
    fn list(&self, dir: &Path) -> SlcResult<Vec<PathBuf>>;

    /// Load the dataset at `path`.
    fn open(&self, path: &Path) -> SlcResult<Dataset>;
}

/// An in-memory store keyed by path, for tests and small pipelines.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<PathBuf, Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, dataset: Dataset) {
        self.entries.insert(path.into(), dataset);
    }
}

impl DatasetStore for MemoryStore {
    fn list(&self, dir: &Path) -> SlcResult<Vec<PathBuf>> {
        // BTreeMap iteration order gives the lexicographic sort
        Ok(self
            .entries
            .keys()
            .filter(|path| {
                path.parent() == Some(dir)
                    && path.extension().map(|e| e == "nc").unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn open(&self, path: &Path) -> SlcResult<Dataset> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| SlcError::Error(format!("no dataset at {}", path.display())))
    }
}
