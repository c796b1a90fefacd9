//! Foundation types for Arbor.
//!
//! Every other Arbor crate depends on `arbor-types` for the identifier that
//! ties the object graph together.
//!
//! # Key Types
//!
//! - [`ObjectId`]: 20-byte content-addressed identifier (SHA-1 digest)
//! - [`TypeError`]: parse failures for textual identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, OID_HEX_LEN, OID_LEN};
