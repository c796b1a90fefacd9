use std::collections::HashMap;
use std::sync::RwLock;

use arbor_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Object store backed by a `HashMap` behind a `RwLock`.
///
/// Nothing is persisted. Objects are cloned in and out, so callers never hold
/// the lock across their own work.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Sum of body sizes, headers excluded.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|obj| obj.size)
            .sum()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let mut map = self.objects.write().expect("lock poisoned");
        // Same ID always maps to the same content, so the first insert wins.
        map.entry(id).or_insert_with(|| {
            debug!(id = %id, kind = %object.kind, size = object.size, "object stored");
            object.clone()
        });
        Ok(id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .field("bytes", &self.total_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    fn blob(content: &[u8]) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, content.to_vec())
    }

    #[test]
    fn stores_under_git_object_ids() {
        let store = InMemoryObjectStore::new();
        let hello = store.put(&blob(b"hello world")).unwrap();
        assert_eq!(hello.to_hex(), "95d09f2b10159347eece71399a7e2e907ea3df4f");

        let empty_tree = StoredObject::new(ObjectKind::Tree, Vec::new());
        let tree = store.put(&empty_tree).unwrap();
        assert_eq!(tree.to_hex(), EMPTY_TREE);
        assert_eq!(store.get(&tree).unwrap(), empty_tree);
    }

    #[test]
    fn kind_is_part_of_the_id() {
        let store = InMemoryObjectStore::new();
        let as_blob = store.put(&blob(b"")).unwrap();
        let as_tree = store
            .put(&StoredObject::new(ObjectKind::Tree, Vec::new()))
            .unwrap();
        assert_ne!(as_blob, as_tree);
        assert_eq!(store.get(&as_blob).unwrap().kind, ObjectKind::Blob);
    }

    #[test]
    fn missing_object() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::from_hex(EMPTY_TREE).unwrap();
        assert!(!store.exists(&id).unwrap());
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn first_put_wins() {
        let store = InMemoryObjectStore::new();
        let id = store.put(&blob(b"same bytes")).unwrap();
        assert_eq!(store.put(&blob(b"same bytes")).unwrap(), id);
        assert_eq!(store.len(), 1);
        assert!(store.exists(&id).unwrap());
    }

    #[test]
    fn bookkeeping() {
        let store = InMemoryObjectStore::default();
        assert!(store.is_empty());
        store.put(&blob(b"12345")).unwrap();
        store.put(&blob(b"123456789")).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_bytes(), 14);
        assert_eq!(format!("{store:?}"), "InMemoryObjectStore { objects: 2, bytes: 14 }");
    }

    #[test]
    fn concurrent_puts_store_one_copy() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let ids: Vec<ObjectId> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(&blob(b"shared data")).unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }
}
