#![forbid(unsafe_code)]

//! Navigation-preference synchronization engine.
//!
//! Maintains an ordered, role-filtered, user-customizable list of
//! navigation entries and keeps it consistent across three disagreeing
//! sources of truth: compiled-in registry defaults, a device-local
//! persistent cache, and a remote preference store. Local edits mirror
//! to the cache synchronously and reach the remote store through a
//! debounced, coalescing, retry-less write lane - the UI is never
//! blocked and no source's data is silently dropped.

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod remote;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod writer;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the working set at the crate root for convenience.
pub use crate::config::SyncConfig;
pub use crate::core::{
    filter_by_role, is_visible_for_roles, reconcile, CoreError, Icon, IconRef, ItemId, ItemPatch,
    ItemRegistry, NavigationItem, Patch, PreferenceRecord, Role, StoreOp, UserId, FALLBACK_ICON,
};
pub use crate::session::{Identity, NavSession};
pub use crate::store::{PreferenceStore, SubscriberId};
