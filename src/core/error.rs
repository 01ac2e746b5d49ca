//! Domain error taxonomy.
//!
//! Nothing in this subsystem is fatal: cache and remote failures are
//! absorbed at their boundaries and the store stays valid. What remains
//! here is the small set of conditions callers can actually act on.

use thiserror::Error;

/// An identifier that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidId {
    #[error("invalid item id {raw:?}: {reason}")]
    Item { raw: String, reason: String },

    #[error("invalid role {raw:?}: {reason}")]
    Role { raw: String, reason: String },

    #[error("invalid icon ref {raw:?}: {reason}")]
    Icon { raw: String, reason: String },

    #[error("invalid user id {raw:?}: {reason}")]
    User { raw: String, reason: String },
}

/// Errors from the pure domain layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}
