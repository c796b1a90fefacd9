//! Content-addressed object storage for Arbor.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Every object is stored immutably under the
//! SHA-1 of its kind header and body.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`LooseObjectStore`] -- one zstd-compressed file per object on disk
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. `put` is idempotent: storing identical bytes twice yields one object.
//! 3. `put` is atomic: an object is either fully visible or absent.
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{StoreConfig, CONFIG_FILE};
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, StoredObject};
pub use traits::ObjectStore;
