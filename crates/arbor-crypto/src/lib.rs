//! Object hashing for Arbor.
//!
//! Object identifiers are SHA-1 digests over a kind header followed by the
//! object body, the same framing git uses for loose objects. Tree IDs
//! produced here are therefore interchangeable with git tree IDs.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::ObjectHasher;
