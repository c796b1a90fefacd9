use thiserror::Error;

/// Failures turning text or byte slices into an [`ObjectId`](crate::ObjectId).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("object id is not valid hex: {0}")]
    InvalidHex(String),

    #[error("object id must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
