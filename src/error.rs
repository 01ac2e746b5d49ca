use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::core::error::CoreError;
use crate::remote::RemoteError;

/// Crate-level convenience error.
///
/// Not a "god error": a thin wrapper over the canonical capability
/// errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
