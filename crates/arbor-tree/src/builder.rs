//! Staged construction of tree objects.
//!
//! A [`TreeBuilder`] holds an unordered name → entry map. Nothing touches the
//! store until [`TreeBuilder::write`], which sorts the entries into tree
//! order, encodes them, hashes the body and stores it if it is new.

use std::collections::HashMap;

use arbor_store::{ObjectKind, ObjectStore, StoredObject};
use arbor_types::ObjectId;
use tracing::debug;

use crate::codec;
use crate::entry::{validate_name, EntryMode, TreeEntry};
use crate::error::{TreeError, TreeResult};
use crate::tree::Tree;

/// Mutable staging area for a new tree.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    entries: HashMap<String, TreeEntry>,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder, optionally seeded with every entry of `seed`.
    pub fn create(seed: Option<&Tree>) -> Self {
        seed.map(Self::from_tree).unwrap_or_default()
    }

    /// Create a builder holding every entry of `tree`.
    pub fn from_tree(tree: &Tree) -> Self {
        let entries = tree
            .iter()
            .map(|e| (e.name.clone(), e.clone()))
            .collect();
        Self { entries }
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a staged entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    /// Stage an entry, replacing any entry with the same name.
    ///
    /// Fails with [`TreeError::InvalidName`] if `name` is empty, `"/"`, or
    /// contains `/` or NUL, and with [`TreeError::InvalidMode`] if `mode` is
    /// not a file, directory, symlink or gitlink mode. The builder is left
    /// untouched on failure.
    pub fn insert(&mut self, name: &str, object_id: ObjectId, mode: EntryMode) -> TreeResult<()> {
        validate_name(name)?;
        if !mode.is_valid() {
            return Err(TreeError::InvalidMode(mode.bits()));
        }
        self.entries
            .insert(name.to_string(), TreeEntry::new(name, mode, object_id));
        Ok(())
    }

    /// Remove the entry called `name`. Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) -> TreeResult<()> {
        self.entries.remove(name);
        Ok(())
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&TreeEntry) -> bool,
    {
        self.entries.retain(|_, entry| keep(entry));
    }

    /// Remove every staged entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Staged entries in canonical tree order.
    pub fn entries(&self) -> Vec<&TreeEntry> {
        let mut sorted: Vec<&TreeEntry> = self.entries.values().collect();
        sorted.sort_by(|a, b| a.cmp_tree_order(b));
        sorted
    }

    /// The canonical tree body for the staged entries.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode_entries(self.entries())
    }

    /// Encode, hash and store the staged entries as a tree.
    ///
    /// Returns the tree's ID. If the store already holds it, nothing is
    /// written. The builder is unchanged and may be written again.
    pub fn write(&self, store: &dyn ObjectStore) -> TreeResult<ObjectId> {
        let object = StoredObject::new(ObjectKind::Tree, self.to_bytes());
        let id = object.compute_id();

        if store.exists(&id)? {
            debug!(id = %id, "tree already stored");
            return Ok(id);
        }

        let stored = store.put(&object)?;
        debug_assert_eq!(stored, id);
        debug!(id = %id, entries = self.len(), size = object.size, "tree written");
        Ok(id)
    }
}
