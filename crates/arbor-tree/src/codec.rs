//! Canonical tree body encoding.
//!
//! ```text
//! [octal mode digits, no padding] [0x20] [name bytes] [0x00] [20-byte object id]
//! ```
//!
//! Entries are concatenated in tree order with no count, length prefix, or
//! trailing delimiter.

use std::cmp::Ordering;
use std::collections::HashSet;

use arbor_types::{ObjectId, OID_LEN};

use crate::entry::{EntryMode, TreeEntry};

/// Structural problems found while decoding a tree body.
///
/// Offsets are byte positions in the body where the bad entry starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("entry at offset {offset}: missing space after mode")]
    MissingSpace { offset: usize },

    #[error("entry at offset {offset}: malformed or unsupported mode")]
    InvalidMode { offset: usize },

    #[error("entry at offset {offset}: missing NUL after name")]
    MissingNul { offset: usize },

    #[error("entry at offset {offset}: empty name")]
    EmptyName { offset: usize },

    #[error("entry at offset {offset}: name {name:?} contains '/'")]
    NameWithSlash { offset: usize, name: String },

    #[error("entry at offset {offset}: name is not valid UTF-8")]
    NonUtf8Name { offset: usize },

    #[error("entry at offset {offset}: truncated object id ({available} of 20 bytes)")]
    TruncatedId { offset: usize, available: usize },

    #[error("entry {name:?} is out of order")]
    Unsorted { name: String },

    #[error("duplicate entry {name:?}")]
    Duplicate { name: String },
}

/// Encode entries that are already in tree order.
pub fn encode_entries<'a, I>(entries: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a TreeEntry>,
{
    let mut body = Vec::new();
    for entry in entries {
        body.extend_from_slice(format!("{:o} ", entry.mode.bits()).as_bytes());
        body.extend_from_slice(entry.name.as_bytes());
        body.push(0);
        body.extend_from_slice(entry.object_id.as_bytes());
    }
    body
}

/// Decode a tree body, checking that entries are strictly sorted and unique.
pub fn decode_entries(data: &[u8]) -> Result<Vec<TreeEntry>, DecodeError> {
    let mut entries: Vec<TreeEntry> = Vec::new();
    let mut names: HashSet<String> = HashSet::new();
    let mut pos = 0;

    while pos < data.len() {
        let offset = pos;
        let rest = &data[pos..];

        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or(DecodeError::MissingSpace { offset })?;
        let mode = parse_mode(&rest[..space]).ok_or(DecodeError::InvalidMode { offset })?;

        let after_mode = &rest[space + 1..];
        let nul = after_mode
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::MissingNul { offset })?;
        let name_bytes = &after_mode[..nul];
        if name_bytes.is_empty() {
            return Err(DecodeError::EmptyName { offset });
        }
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| DecodeError::NonUtf8Name { offset })?
            .to_string();
        if name.contains('/') {
            return Err(DecodeError::NameWithSlash { offset, name });
        }

        let id_bytes = &after_mode[nul + 1..];
        if id_bytes.len() < OID_LEN {
            return Err(DecodeError::TruncatedId {
                offset,
                available: id_bytes.len(),
            });
        }
        let object_id = ObjectId::from_slice(&id_bytes[..OID_LEN])
            .map_err(|_| DecodeError::TruncatedId {
                offset,
                available: id_bytes.len(),
            })?;

        let entry = TreeEntry::new(name, mode, object_id);
        if let Some(prev) = entries.last() {
            if prev.cmp_tree_order(&entry) != Ordering::Less {
                return Err(DecodeError::Unsorted { name: entry.name });
            }
        }
        if !names.insert(entry.name.clone()) {
            return Err(DecodeError::Duplicate { name: entry.name });
        }

        pos += space + 1 + nul + 1 + OID_LEN;
        entries.push(entry);
    }

    Ok(entries)
}

fn parse_mode(digits: &[u8]) -> Option<EntryMode> {
    if digits.is_empty() {
        return None;
    }
    let mut bits: u32 = 0;
    for &d in digits {
        if !(b'0'..=b'7').contains(&d) {
            return None;
        }
        bits = bits.checked_mul(8)?.checked_add(u32::from(d - b'0'))?;
    }
    // Stored trees hold only modes that `TreeBuilder::insert` accepts.
    Some(EntryMode::from_bits(bits)).filter(EntryMode::is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; OID_LEN])
    }

    fn raw_entry(mode: &str, name: &str, id: ObjectId) -> Vec<u8> {
        let mut out = format!("{mode} {name}\0").into_bytes();
        out.extend_from_slice(id.as_bytes());
        out
    }

    #[test]
    fn encodes_modes_without_padding() {
        let entries = [
            TreeEntry::new("dir", EntryMode::DIRECTORY, oid(1)),
            TreeEntry::new("file", EntryMode::REGULAR, oid(2)),
        ];
        let body = encode_entries(&entries);
        let mut expected = raw_entry("40000", "dir", oid(1));
        expected.extend(raw_entry("100644", "file", oid(2)));
        assert_eq!(body, expected);
    }

    #[test]
    fn empty_body_decodes_to_no_entries() {
        assert!(decode_entries(&[]).unwrap().is_empty());
    }

    #[test]
    fn decodes_encoded_body() {
        let entries = vec![
            TreeEntry::new("a.txt", EntryMode::REGULAR, oid(3)),
            TreeEntry::new("bin", EntryMode::EXECUTABLE, oid(4)),
            TreeEntry::new("link", EntryMode::SYMLINK, oid(5)),
            TreeEntry::new("src", EntryMode::DIRECTORY, oid(6)),
        ];
        assert_eq!(decode_entries(&encode_entries(&entries)).unwrap(), entries);
    }

    #[test]
    fn accepts_zero_padded_mode() {
        let body = raw_entry("040000", "dir", oid(1));
        let entries = decode_entries(&body).unwrap();
        assert_eq!(entries[0].mode, EntryMode::DIRECTORY);
    }

    #[test]
    fn rejects_missing_space() {
        let body = b"100644".to_vec();
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::MissingSpace { offset: 0 })
        );
    }

    #[test]
    fn rejects_bad_mode_digits() {
        for mode in ["", "10064x", "100648", "77777777777", "0", "777", "60000", "1100644"] {
            let body = raw_entry(mode, "f", oid(1));
            assert_eq!(
                decode_entries(&body),
                Err(DecodeError::InvalidMode { offset: 0 }),
                "mode {mode:?}"
            );
        }
    }

    #[test]
    fn rejects_missing_nul() {
        let body = b"100644 name-without-terminator".to_vec();
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::MissingNul { offset: 0 })
        );
    }

    #[test]
    fn rejects_truncated_id() {
        let mut body = raw_entry("100644", "a", oid(1));
        body.truncate(body.len() - 5);
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::TruncatedId {
                offset: 0,
                available: 15
            })
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut body = raw_entry("100644", "a", oid(1));
        let second = body.len();
        body.extend_from_slice(b"100644 b");
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::MissingNul { offset: second })
        );
    }

    #[test]
    fn rejects_bad_names() {
        let body = raw_entry("100644", "", oid(1));
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::EmptyName { offset: 0 })
        );

        let body = raw_entry("100644", "a/b", oid(1));
        assert!(matches!(
            decode_entries(&body),
            Err(DecodeError::NameWithSlash { .. })
        ));

        let mut body = b"100644 \xff\xfe\0".to_vec();
        body.extend_from_slice(oid(1).as_bytes());
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::NonUtf8Name { offset: 0 })
        );
    }

    #[test]
    fn rejects_unsorted_entries() {
        let mut body = raw_entry("100644", "b", oid(1));
        body.extend(raw_entry("100644", "a", oid(2)));
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::Unsorted { name: "a".into() })
        );
    }

    #[test]
    fn rejects_directory_sorted_by_plain_name() {
        // Plain byte order puts "foo" before "foo.txt", tree order does not.
        let mut body = raw_entry("40000", "foo", oid(1));
        body.extend(raw_entry("100644", "foo.txt", oid(2)));
        assert!(matches!(
            decode_entries(&body),
            Err(DecodeError::Unsorted { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut body = raw_entry("100644", "a", oid(1));
        body.extend(raw_entry("100644", "a", oid(2)));
        assert!(matches!(
            decode_entries(&body),
            Err(DecodeError::Unsorted { .. })
        ));

        // A file and a directory with the same name are in order but not unique.
        let mut body = raw_entry("100644", "a", oid(1));
        body.extend(raw_entry("40000", "a", oid(2)));
        assert_eq!(
            decode_entries(&body),
            Err(DecodeError::Duplicate { name: "a".into() })
        );
    }
}
