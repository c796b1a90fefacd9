use arbor_store::{ObjectKind, ObjectStore};
use arbor_types::ObjectId;
use tracing::debug;

use crate::builder::TreeBuilder;
use crate::codec;
use crate::entry::{compare_names, TreeEntry};
use crate::error::{TreeError, TreeResult};

/// A parsed, immutable tree object.
///
/// Entries are strictly sorted in tree order and names are unique. A `Tree`
/// is never modified; build a new one with [`TreeBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    id: ObjectId,
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Load and parse the tree stored under `id`.
    pub fn lookup(store: &dyn ObjectStore, id: &ObjectId) -> TreeResult<Self> {
        let object = store.get(id)?;
        if object.kind != ObjectKind::Tree {
            return Err(TreeError::UnexpectedKind {
                id: *id,
                expected: ObjectKind::Tree,
                actual: object.kind,
            });
        }
        let tree = Self::parse(*id, &object.data)?;
        debug!(id = %id, entries = tree.len(), "tree loaded");
        Ok(tree)
    }

    /// Parse a tree body that is known to be stored under `id`.
    pub fn parse(id: ObjectId, data: &[u8]) -> TreeResult<Self> {
        let entries =
            codec::decode_entries(data).map_err(|source| TreeError::Corrupt { id, source })?;
        Ok(Self { id, entries })
    }

    /// The ID this tree is stored under.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index` in tree order.
    pub fn get(&self, index: usize) -> TreeResult<&TreeEntry> {
        self.entries.get(index).ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Look up an entry by name.
    ///
    /// A name is searched both as a file and as a directory, since the two
    /// occupy different positions in tree order.
    pub fn entry_by_name(&self, name: &str) -> Option<&TreeEntry> {
        let key = name.as_bytes();
        [false, true].into_iter().find_map(|as_tree| {
            self.entries
                .binary_search_by(|e| compare_names(e.name.as_bytes(), e.is_tree(), key, as_tree))
                .ok()
                .map(|i| &self.entries[i])
        })
    }

    /// All entries in tree order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Iterate over entries in tree order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    /// A builder seeded with every entry of this tree.
    pub fn to_builder(&self) -> TreeBuilder {
        TreeBuilder::from_tree(self)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
