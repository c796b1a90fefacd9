use arbor_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same kind and data always
///   produce the same ID.
/// - `put` is idempotent and atomic: concurrent writers of identical content
///   observe one object, and a half-written object is never visible through
///   `get` or `exists`.
/// - Concurrent reads are always safe (objects are immutable).
/// - The store never interprets object contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op.
    fn put(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Read an object by its content-addressed ID.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the
    /// object does not exist.
    fn get(&self, id: &ObjectId) -> StoreResult<StoredObject>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;
}
