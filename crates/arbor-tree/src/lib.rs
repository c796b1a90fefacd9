//! Tree objects for Arbor.
//!
//! A tree is an immutable, content-addressed directory listing: a sorted list
//! of named entries, each pointing by [`ObjectId`](arbor_types::ObjectId) to
//! a blob or to another tree. Nesting is expressed only through those
//! references, so a subtree written once can be shared by any number of
//! parents without being re-hashed or re-stored.
//!
//! # Key Types
//!
//! - [`TreeBuilder`] -- mutable staging area; `write` canonicalizes, hashes
//!   and stores a new tree
//! - [`Tree`] -- parsed, read-only tree loaded from a store
//! - [`TreeEntry`] / [`EntryMode`] -- one named child reference and its mode
//! - [`TreeWalk`] -- lazy pre-order traversal of a tree hierarchy
//!
//! # Canonical Encoding
//!
//! ```text
//! <octal mode> SP <name> NUL <20-byte object id>   (repeated, sorted)
//! ```
//!
//! Entries are sorted byte-wise by name, with directory names compared as if
//! they ended in `/`. Identical entry sets therefore always encode to
//! identical bytes and hash to the same ID.

pub mod builder;
pub mod codec;
pub mod entry;
pub mod error;
pub mod tree;
pub mod walk;

pub use builder::TreeBuilder;
pub use codec::DecodeError;
pub use entry::{validate_name, EntryMode, TreeEntry};
pub use error::{TreeError, TreeResult};
pub use tree::Tree;
pub use walk::{TreeWalk, WalkItem};
