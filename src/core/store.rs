//! Local BOM store
//!
//! Holds every cached part collection, keyed by (team, robot, system), and
//! persists them as a single JSON document. The store is the only owner of
//! these collections: callers borrow parts for evaluation and filtering and
//! go through [`BomStore::update_part`] or [`BomStore::replace`] to change
//! them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::process::{evaluate_all, refresh};
use crate::entities::part::Part;

/// Key under which the part collections are stored in the state document
pub const BOM_DATA_KEY: &str = "bom_data";

/// System used when none is given
pub const DEFAULT_SYSTEM: &str = "Main";

/// `team -> robot -> system -> parts`
pub type BomTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<Part>>>>;

/// Identifies one independent BOM collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    pub team: String,
    pub robot: String,
    pub system: String,
}

impl Scope {
    pub fn new(
        team: impl Into<String>,
        robot: impl Into<String>,
        system: impl Into<String>,
    ) -> Self {
        Self {
            team: team.into(),
            robot: robot.into(),
            system: system.into(),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.team, self.robot, self.system)
    }
}

/// Errors that can occur in the local store
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Part '{name}' not found in {scope}")]
    #[diagnostic(
        code(rbt::store::part_not_found),
        help("part names are matched exactly; run `rbt list` to see the parts in this scope")
    )]
    PartNotFound { name: String, scope: Scope },

    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file {path} is corrupt: {source}")]
    #[diagnostic(
        code(rbt::store::corrupt),
        help("fix the file by hand or remove it and run `rbt pull` to re-download the BOM")
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// On-disk shape of the state document
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default, rename = "bom_data")]
    bom_data: BomTree,

    /// Last filter criterion chosen by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_filter: Option<String>,
}

/// Cache of part collections for every scope
#[derive(Debug, Default)]
pub struct BomStore {
    tree: BomTree,
    current_filter: Option<String>,
    path: Option<PathBuf>,
}

impl BomStore {
    /// Create a store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store backed by `path`
    ///
    /// A missing file is an empty store. Every loaded part is evaluated.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state file yet, starting empty");
            return Ok(Self {
                path: Some(path),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let doc: StateDocument = if content.trim().is_empty() {
            StateDocument::default()
        } else {
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?
        };

        let mut store = Self {
            tree: doc.bom_data,
            current_filter: doc.current_filter,
            path: Some(path),
        };
        store
            .tree
            .values_mut()
            .flat_map(|robots| robots.values_mut())
            .flat_map(|systems| systems.values_mut())
            .for_each(|parts| evaluate_all(parts));
        Ok(store)
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the whole store to its backing file
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let doc = StateDocument {
            bom_data: self.tree.clone(),
            current_filter: self.current_filter.clone(),
        };
        let json = serde_json::to_string_pretty(&doc).map_err(StoreError::Serialize)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // The document on disk is always complete: write a sibling, then rename
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Cached parts for a scope; empty when nothing is cached
    pub fn load(&self, scope: &Scope) -> &[Part] {
        self.tree
            .get(&scope.team)
            .and_then(|robots| robots.get(&scope.robot))
            .and_then(|systems| systems.get(&scope.system))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether anything is cached for a scope
    pub fn contains(&self, scope: &Scope) -> bool {
        self.tree
            .get(&scope.team)
            .and_then(|robots| robots.get(&scope.robot))
            .is_some_and(|systems| systems.contains_key(&scope.system))
    }

    /// Look up a part by exact name
    pub fn find_part(&self, scope: &Scope, name: &str) -> Option<&Part> {
        self.load(scope).iter().find(|p| p.name == name)
    }

    /// Overwrite a scope's collection
    ///
    /// No merge with prior contents takes place; the parts are evaluated on
    /// the way in.
    pub fn replace(&mut self, scope: &Scope, mut parts: Vec<Part>) {
        evaluate_all(&mut parts);
        tracing::debug!(scope = %scope, parts = parts.len(), "replacing scope");
        self.tree
            .entry(scope.team.clone())
            .or_default()
            .entry(scope.robot.clone())
            .or_default()
            .insert(scope.system.clone(), parts);
    }

    /// Replace the part with the same name
    ///
    /// Fails without touching the collection if no part has that name.
    pub fn update_part(&mut self, scope: &Scope, mut part: Part) -> Result<&Part, StoreError> {
        let slot = self
            .tree
            .get_mut(&scope.team)
            .and_then(|robots| robots.get_mut(&scope.robot))
            .and_then(|systems| systems.get_mut(&scope.system))
            .and_then(|parts| parts.iter_mut().find(|p| p.name == part.name));

        let Some(slot) = slot else {
            tracing::warn!(scope = %scope, part = %part.name, "part not found, update abandoned");
            return Err(StoreError::PartNotFound {
                name: part.name,
                scope: scope.clone(),
            });
        };

        refresh(&mut part);
        *slot = part;
        Ok(slot)
    }

    /// Drop a scope's collection
    pub fn remove_scope(&mut self, scope: &Scope) -> Option<Vec<Part>> {
        let robots = self.tree.get_mut(&scope.team)?;
        let systems = robots.get_mut(&scope.robot)?;
        let removed = systems.remove(&scope.system);

        if systems.is_empty() {
            robots.remove(&scope.robot);
        }
        if robots.is_empty() {
            self.tree.remove(&scope.team);
        }
        removed
    }

    /// Drop every cached collection and the remembered filter
    pub fn clear(&mut self) {
        self.tree.clear();
        self.current_filter = None;
    }

    /// Every scope with a cached collection
    pub fn scopes(&self) -> Vec<Scope> {
        self.tree
            .iter()
            .flat_map(|(team, robots)| {
                robots.iter().flat_map(move |(robot, systems)| {
                    systems.keys().map(move |system| Scope::new(team, robot, system))
                })
            })
            .collect()
    }

    pub fn current_filter(&self) -> Option<&str> {
        self.current_filter.as_deref()
    }

    pub fn set_current_filter(&mut self, filter: impl Into<String>) {
        self.current_filter = Some(filter.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::part::{Quantity, StageKind};
    use tempfile::TempDir;

    fn scope() -> Scope {
        Scope::new("1234", "Ares", DEFAULT_SYSTEM)
    }

    fn sample_parts() -> Vec<Part> {
        vec![
            Part::new("Shaft", 5)
                .with_stage(StageKind::Process1, "Lathe")
                .with_progress(StageKind::Process1, 2),
            Part::new("Bolt", 20),
        ]
    }

    #[test]
    fn test_load_missing_scope_is_empty() {
        let store = BomStore::in_memory();
        assert!(store.load(&scope()).is_empty());
        assert!(!store.contains(&scope()));
    }

    #[test]
    fn test_replace_evaluates_parts() {
        let mut store = BomStore::in_memory();
        store.replace(&scope(), sample_parts());

        let parts = store.load(&scope());
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].state.current_process.as_deref(), Some("Lathe"));
        assert_eq!(parts[0].state.remaining, Quantity::Count(3));
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = BomStore::in_memory();
        store.replace(&scope(), sample_parts());
        store.replace(&scope(), vec![Part::new("Gear", 1)]);

        let names: Vec<_> = store.load(&scope()).iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Gear"]);
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut store = BomStore::in_memory();
        let other = Scope::new("1234", "Ares", "Intake");
        store.replace(&scope(), sample_parts());
        store.replace(&other, vec![Part::new("Roller", 2)]);

        assert_eq!(store.load(&scope()).len(), 2);
        assert_eq!(store.load(&other).len(), 1);
        assert_eq!(store.scopes().len(), 2);
    }

    #[test]
    fn test_update_part_replaces_by_name() {
        let mut store = BomStore::in_memory();
        store.replace(&scope(), sample_parts());

        let edited = store.load(&scope())[0]
            .clone()
            .with_progress(StageKind::Process1, 5);
        let updated = store.update_part(&scope(), edited).unwrap();
        assert!(updated.state.process1_completed);
        assert_eq!(updated.state.current_process, None);

        assert_eq!(store.load(&scope())[0].process1_qty, 5);
    }

    #[test]
    fn test_update_missing_part_leaves_scope_unchanged() {
        let mut store = BomStore::in_memory();
        store.replace(&scope(), sample_parts());
        let before = store.load(&scope()).to_vec();

        let err = store
            .update_part(&scope(), Part::new("Ghost", 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::PartNotFound { ref name, .. } if name == "Ghost"));
        assert_eq!(store.load(&scope()), before.as_slice());
    }

    #[test]
    fn test_update_in_unknown_scope_fails() {
        let mut store = BomStore::in_memory();
        let result = store.update_part(&scope(), Part::new("Shaft", 5));
        assert!(matches!(result, Err(StoreError::PartNotFound { .. })));
    }

    #[test]
    fn test_remove_scope_prunes_empty_levels() {
        let mut store = BomStore::in_memory();
        store.replace(&scope(), sample_parts());
        assert!(store.remove_scope(&scope()).is_some());
        assert!(store.scopes().is_empty());
        assert!(store.remove_scope(&scope()).is_none());
    }

    #[test]
    fn test_save_and_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state").join("state.json");

        let mut store = BomStore::open(&path).unwrap();
        store.replace(&scope(), sample_parts());
        store.set_current_filter("process1");
        store.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(BOM_DATA_KEY));

        let reopened = BomStore::open(&path).unwrap();
        assert_eq!(reopened.current_filter(), Some("process1"));
        let parts = reopened.load(&scope());
        assert_eq!(parts.len(), 2);
        // Derived state is recomputed, not read back
        assert_eq!(parts[0].state.current_process.as_deref(), Some("Lathe"));
    }

    #[test]
    fn test_open_legacy_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(
            &path,
            r#"{"bom_data": {"1234": {"Ares": {"Main": [
                {"Part Name": "Plate", "Quantity": "4", "Process1": "Router", "process1Quantity": 4}
            ]}}}}"#,
        )
        .unwrap();

        let store = BomStore::open(&path).unwrap();
        let part = store.find_part(&scope(), "Plate").unwrap();
        assert!(part.state.process1_completed);
    }

    #[test]
    fn test_open_corrupt_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            BomStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut store = BomStore::in_memory();
        store.replace(&scope(), sample_parts());
        store.set_current_filter("cots");
        store.clear();
        assert!(store.scopes().is_empty());
        assert_eq!(store.current_filter(), None);
    }
}
