use arbor_types::ObjectId;
use sha1::{Digest, Sha1};

/// Kind-framed SHA-1 object hasher.
///
/// Each hasher carries a kind tag (e.g., `"blob"`, `"tree"`). Hashing writes
/// the header `"<kind> <len>\0"` before the body, so a blob and a tree with
/// identical bytes produce different IDs.
pub struct ObjectHasher {
    kind: &'static str,
}

impl ObjectHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { kind: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { kind: "tree" };
    /// Hasher for commit objects (gitlink targets).
    pub const COMMIT: Self = Self { kind: "commit" };

    /// The framing header for a body of `len` bytes.
    pub fn header(&self, len: usize) -> Vec<u8> {
        format!("{} {}\0", self.kind, len).into_bytes()
    }

    /// Hash an object body.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(self.header(data.len()));
        hasher.update(data);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The kind tag written in the header.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}
