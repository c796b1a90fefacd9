use std::fmt;
use std::str::FromStr;

use arbor_crypto::ObjectHasher;
use arbor_types::ObjectId;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing: sorted entries mapping names to object references.
    Tree,
    /// Commit, only ever referenced by gitlink entries.
    Commit,
}

impl ObjectKind {
    /// The hasher that frames objects of this kind.
    pub fn hasher(&self) -> &'static ObjectHasher {
        match self {
            Self::Blob => &ObjectHasher::BLOB,
            Self::Tree => &ObjectHasher::TREE,
            Self::Commit => &ObjectHasher::COMMIT,
        }
    }

    /// The kind tag as written in object headers.
    pub fn as_str(&self) -> &'static str {
        self.hasher().kind()
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(format!("unknown object kind: {other:?}")),
        }
    }
}

/// A stored object: kind tag + raw body + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents of the data. It is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The raw body of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }
}
