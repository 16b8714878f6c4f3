//! Manifest model: which types of which modules need schemas and validators.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Serialized marker for "every exported type of the module".
pub const WILDCARD: &str = "*";

/// Types requested from one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum TypeSelection {
    /// Every exported type of the module (`export * from './x'`).
    All,
    /// Named types, in declaration order.
    Named(Vec<String>),
}

impl TypeSelection {
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Requested names, or `None` for the wildcard.
    #[must_use]
    pub fn names(&self) -> Option<&[String]> {
        match self {
            Self::All => None,
            Self::Named(names) => Some(names),
        }
    }
}

impl From<Vec<String>> for TypeSelection {
    fn from(names: Vec<String>) -> Self {
        if names.is_empty() || names.iter().any(|n| n == WILDCARD) {
            Self::All
        } else {
            Self::Named(names)
        }
    }
}

impl From<TypeSelection> for Vec<String> {
    fn from(selection: TypeSelection) -> Self {
        match selection {
            TypeSelection::All => vec![WILDCARD.to_string()],
            TypeSelection::Named(names) => names,
        }
    }
}

/// One re-exported module and the types requested from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Module specifier as written, relative to the manifest directory.
    pub module: String,
    pub selection: TypeSelection,
}

/// Ordered set of manifest entries, one per distinct module path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    /// Record a module's selection. A repeated module keeps its original
    /// position and takes the newer selection.
    pub fn insert(&mut self, module: impl Into<String>, selection: TypeSelection) {
        let module = module.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.module == module) {
            entry.selection = selection;
        } else {
            self.entries.push(ManifestEntry { module, selection });
        }
    }

    #[must_use]
    pub fn get(&self, module: &str) -> Option<&TypeSelection> {
        self.entries
            .iter()
            .find(|e| e.module == module)
            .map(|e| &e.selection)
    }

    /// Directory module specifiers are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }
}
