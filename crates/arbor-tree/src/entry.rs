use std::cmp::Ordering;
use std::fmt;

use arbor_store::ObjectKind;
use arbor_types::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TreeError, TreeResult};

/// File mode of a tree entry: object type bits plus permission bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryMode(u32);

impl EntryMode {
    /// Normal file (0o100644).
    pub const REGULAR: Self = Self(0o100644);
    /// Executable file (0o100755).
    pub const EXECUTABLE: Self = Self(0o100755);
    /// Symbolic link (0o120000).
    pub const SYMLINK: Self = Self(0o120000);
    /// Subtree / directory (0o040000).
    pub const DIRECTORY: Self = Self(0o040000);
    /// Submodule commit reference (0o160000).
    pub const GITLINK: Self = Self(0o160000);

    const TYPE_MASK: u32 = 0o170000;
    const MAX_BITS: u32 = 0o177777;

    /// Wrap raw mode bits. No validation happens here; see [`is_valid`](Self::is_valid).
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw mode bits.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if this entry points at a subtree.
    pub const fn is_tree(&self) -> bool {
        self.0 & Self::TYPE_MASK == Self::DIRECTORY.0
    }

    /// Returns `true` if the type bits name a file, directory, symlink or
    /// gitlink and nothing above the permission bits is set.
    pub fn is_valid(&self) -> bool {
        if self.0 & !Self::MAX_BITS != 0 {
            return false;
        }
        matches!(
            self.0 & Self::TYPE_MASK,
            0o100000 | 0o040000 | 0o120000 | 0o160000
        )
    }

    /// The kind of object an entry with this mode refers to.
    pub fn object_kind(&self) -> ObjectKind {
        match self.0 & Self::TYPE_MASK {
            0o040000 => ObjectKind::Tree,
            0o160000 => ObjectKind::Commit,
            _ => ObjectKind::Blob,
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06o}", self.0)
    }
}

impl From<u32> for EntryMode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

// Octal text, as modes are conventionally written.
impl Serialize for EntryMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:o}", self.0))
    }
}

impl<'de> Deserialize<'de> for EntryMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        u32::from_str_radix(&s, 8)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Entry name: one path segment, never containing `/`.
    pub name: String,
    /// File mode (regular, executable, symlink, directory, gitlink).
    pub mode: EntryMode,
    /// Content-addressed ID of the referenced object.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(name: impl Into<String>, mode: EntryMode, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            mode,
            object_id,
        }
    }

    /// Returns `true` if this entry points at a subtree.
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Compare two entries in canonical tree order.
    pub fn cmp_tree_order(&self, other: &Self) -> Ordering {
        compare_names(
            self.name.as_bytes(),
            self.is_tree(),
            other.name.as_bytes(),
            other.is_tree(),
        )
    }
}

/// Canonical tree ordering.
///
/// Names compare byte-wise, with directory names treated as if suffixed by
/// `/`. A file `foo.txt` therefore sorts before a directory `foo`, which
/// sorts before a file `foo0`.
pub fn compare_names(a: &[u8], a_is_tree: bool, b: &[u8], b_is_tree: bool) -> Ordering {
    let a_suffix: &[u8] = if a_is_tree { b"/" } else { b"" };
    let b_suffix: &[u8] = if b_is_tree { b"/" } else { b"" };
    a.iter().chain(a_suffix).cmp(b.iter().chain(b_suffix))
}

/// Check that `name` is a single, non-empty path segment.
pub fn validate_name(name: &str) -> TreeResult<()> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name == "/" {
        "name must not be the root"
    } else if name.contains('/') {
        "name must not contain '/'"
    } else if name.contains('\0') {
        "name must not contain NUL"
    } else {
        return Ok(());
    };
    Err(TreeError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_modes() {
        assert_eq!(EntryMode::REGULAR.bits(), 0o100644);
        assert!(EntryMode::DIRECTORY.is_tree());
        assert!(!EntryMode::REGULAR.is_tree());
        assert!(!EntryMode::GITLINK.is_tree());
        for mode in [
            EntryMode::REGULAR,
            EntryMode::EXECUTABLE,
            EntryMode::SYMLINK,
            EntryMode::DIRECTORY,
            EntryMode::GITLINK,
        ] {
            assert!(mode.is_valid(), "{mode} should be valid");
        }
    }

    #[test]
    fn invalid_modes() {
        assert!(!EntryMode::from_bits(0).is_valid());
        assert!(!EntryMode::from_bits(0o777).is_valid());
        assert!(!EntryMode::from_bits(0o060000).is_valid());
        assert!(!EntryMode::from_bits(0o1100644).is_valid());
    }

    #[test]
    fn object_kinds() {
        assert_eq!(EntryMode::REGULAR.object_kind(), ObjectKind::Blob);
        assert_eq!(EntryMode::SYMLINK.object_kind(), ObjectKind::Blob);
        assert_eq!(EntryMode::DIRECTORY.object_kind(), ObjectKind::Tree);
        assert_eq!(EntryMode::GITLINK.object_kind(), ObjectKind::Commit);
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(EntryMode::DIRECTORY.to_string(), "040000");
        assert_eq!(EntryMode::EXECUTABLE.to_string(), "100755");
    }

    #[test]
    fn entry_serializes_mode_as_octal() {
        let entry = TreeEntry::new("dir", EntryMode::DIRECTORY, ObjectId::from_hash([0; 20]));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["mode"], "40000");
        assert_eq!(json["name"], "dir");
        let back: TreeEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn directories_compare_with_trailing_slash() {
        let dir = TreeEntry::new("foo", EntryMode::DIRECTORY, ObjectId::from_hash([0; 20]));
        let dotted = TreeEntry::new("foo.txt", EntryMode::REGULAR, ObjectId::from_hash([0; 20]));
        let zero = TreeEntry::new("foo0", EntryMode::REGULAR, ObjectId::from_hash([0; 20]));
        assert_eq!(dotted.cmp_tree_order(&dir), Ordering::Less);
        assert_eq!(dir.cmp_tree_order(&zero), Ordering::Less);

        // Without the suffix rule the directory would sort first.
        let file = TreeEntry::new("foo", EntryMode::REGULAR, ObjectId::from_hash([0; 20]));
        assert_eq!(file.cmp_tree_order(&dotted), Ordering::Less);
    }

    #[test]
    fn same_name_file_sorts_before_directory() {
        assert_eq!(compare_names(b"a", false, b"a", true), Ordering::Less);
        assert_eq!(compare_names(b"a", true, b"a", true), Ordering::Equal);
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("new.txt").is_ok());
        assert!(validate_name(".hidden").is_ok());
        for bad in ["", "/", "folder/new.txt", "trailing/", "nul\0byte"] {
            assert!(
                matches!(validate_name(bad), Err(TreeError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
