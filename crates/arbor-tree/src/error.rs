//! Error types for the tree crate.

use arbor_store::{ObjectKind, StoreError};
use arbor_types::ObjectId;

use crate::codec::DecodeError;

/// Errors that can occur while building or reading trees.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// An entry name is empty, `"/"`, or contains `/` or NUL.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// An entry mode does not describe a file, directory, symlink or gitlink.
    #[error("invalid entry mode {0:o}")]
    InvalidMode(u32),

    /// The requested tree is not in the store.
    #[error("tree not found: {0}")]
    NotFound(ObjectId),

    /// Stored bytes are not a well-formed, correctly sorted tree.
    #[error("corrupt tree {id}: {source}")]
    Corrupt {
        id: ObjectId,
        #[source]
        source: DecodeError,
    },

    /// The object exists but is not a tree.
    #[error("object {id} is a {actual}, expected {expected}")]
    UnexpectedKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// Entry index past the end of a tree.
    #[error("entry index {index} out of range for tree with {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// The underlying store failed.
    #[error("store failure: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for TreeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
