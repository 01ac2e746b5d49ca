//! Pure domain layer: identity atoms, the item model, wire projections,
//! the registry, the role gate, mutation vocabulary, and reconciliation.

pub mod error;
pub mod identity;
pub mod item;
pub mod ops;
pub mod reconcile;
pub mod registry;
pub mod roles;
pub mod wire;

pub use error::{CoreError, InvalidId};
pub use identity::{IconRef, ItemId, Role, UserId};
pub use item::NavigationItem;
pub use ops::{ItemPatch, Patch, StoreOp};
pub use reconcile::reconcile;
pub use registry::{Icon, ItemRegistry, FALLBACK_ICON};
pub use roles::{filter_by_role, is_visible_for_roles};
pub use wire::{CachedItem, PreferenceRecord};
