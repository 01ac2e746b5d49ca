//! Mutation vocabulary.
//!
//! Provides:
//! - `Patch<T>` - three-way field update (Keep, Clear, Set)
//! - `ItemPatch` - partial update for a navigation item
//! - `StoreOp` - reified store mutation, the queue/replay unit

use super::identity::{IconRef, ItemId};
use super::item::NavigationItem;

/// Three-way patch for updating a field.
///
/// The clean solution to the `Option<Option<T>>` problem for nullable
/// fields:
/// - `Keep` - don't change the field
/// - `Clear` - set the field to None
/// - `Set(T)` - set the field to a new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

// Manual impl: the derive would require `T: Default`.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

/// Partial update for a navigation item. All fields default to `Keep`.
///
/// `Clear` is meaningful only for `badge`; on the non-nullable fields it
/// acts as `Keep`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Patch<String>,
    pub path: Patch<String>,
    pub icon: Patch<IconRef>,
    pub badge: Patch<String>,
    pub visible: Patch<bool>,
    pub order: Patch<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.path.is_keep()
            && self.icon.is_keep()
            && self.badge.is_keep()
            && self.visible.is_keep()
            && self.order.is_keep()
    }

    /// Shallow-merge into an item. Returns true if anything changed.
    pub fn apply_to(&self, item: &mut NavigationItem) -> bool {
        let mut changed = false;
        if let Patch::Set(name) = &self.name {
            if item.name != *name {
                item.name = name.clone();
                changed = true;
            }
        }
        if let Patch::Set(path) = &self.path {
            if item.path != *path {
                item.path = path.clone();
                changed = true;
            }
        }
        if let Patch::Set(icon) = &self.icon {
            if item.icon != *icon {
                item.icon = icon.clone();
                changed = true;
            }
        }
        match &self.badge {
            Patch::Keep => {}
            Patch::Clear => {
                if item.badge.is_some() {
                    item.badge = None;
                    changed = true;
                }
            }
            Patch::Set(badge) => {
                if item.badge.as_deref() != Some(badge.as_str()) {
                    item.badge = Some(badge.clone());
                    changed = true;
                }
            }
        }
        if let Patch::Set(visible) = self.visible {
            if item.visible != visible {
                item.visible = visible;
                changed = true;
            }
        }
        if let Patch::Set(order) = self.order {
            if item.order != order {
                item.order = order;
                changed = true;
            }
        }
        changed
    }
}

/// A reified store mutation.
///
/// The session queues these while the initial remote fetch is in flight
/// and replays them on top of the reconciled list; the store applies them
/// through a single entry point so no-op detection lives in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Add(NavigationItem),
    Remove(ItemId),
    Update { id: ItemId, patch: ItemPatch },
    SetVisibility { id: ItemId, visible: bool },
    ToggleVisibility(ItemId),
    Reorder(Vec<ItemId>),
    Reset,
}
