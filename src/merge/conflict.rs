//! Conflict types for merge operations.

use crate::fieldpath::{ManagedFields, Path, Set};
use std::collections::BTreeMap;
use std::fmt;

/// Conflict represents a single field conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The manager that owns the conflicting field.
    pub manager: String,
    /// The path to the conflicting field.
    pub path: Path,
}

impl Conflict {
    /// Creates a new conflict.
    pub fn new(manager: impl Into<String>, path: Path) -> Self {
        Conflict {
            manager: manager.into(),
            path,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conflict with manager '{}' at {}", self.manager, self.path)
    }
}

impl std::error::Error for Conflict {}

/// Conflicts is a collection of conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conflicts {
    conflicts: Vec<Conflict>,
}

impl Conflicts {
    /// Creates a new empty Conflicts collection.
    pub fn new() -> Self {
        Conflicts {
            conflicts: Vec::new(),
        }
    }

    /// Adds a conflict.
    pub fn add(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
    }

    /// Returns true if there are no conflicts.
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Returns the number of conflicts.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Returns an iterator over the conflicts.
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    /// Converts the conflicts to a Set of paths.
    pub fn to_set(&self) -> Set {
        let mut set = Set::new();
        for conflict in &self.conflicts {
            set.insert(&conflict.path);
        }
        set
    }

    /// Returns the error message in Go-compatible format.
    /// Groups conflicts by manager, sorted alphabetically.
    pub fn error(&self) -> String {
        if self.conflicts.is_empty() {
            return String::new();
        }

        // Group by manager, using BTreeMap for sorted order
        let mut by_manager: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
        for conflict in &self.conflicts {
            by_manager
                .entry(&conflict.manager)
                .or_default()
                .push(&conflict.path);
        }

        // Sort paths within each manager
        for paths in by_manager.values_mut() {
            paths.sort_by_key(|p| p.to_string());
        }

        // Build output
        let mut result = String::new();
        for (i, (manager, paths)) in by_manager.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            result.push_str(&format!("conflicts with \"{}\":", manager));
            for path in paths {
                result.push_str(&format!("\n- {}", path));
            }
        }
        result
    }
}

impl IntoIterator for Conflicts {
    type Item = Conflict;
    type IntoIter = std::vec::IntoIter<Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.conflicts.into_iter()
    }
}

impl fmt::Display for Conflicts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error())
    }
}

impl std::error::Error for Conflicts {}

/// Extracts conflicts from ManagedFields.
/// Creates a Conflict entry for each path owned by each manager.
pub fn conflicts_from_managers(managers: &ManagedFields) -> Conflicts {
    let mut conflicts = Conflicts::new();

    for (manager, vs) in managers.iter() {
        vs.set().iterate(|path| {
            conflicts.add(Conflict::new(manager.clone(), path.clone()));
        });
    }

    conflicts
}
