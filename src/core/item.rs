//! The navigation entry.
//!
//! The authoritative in-memory shape. Wire and storage projections live
//! in `wire`; this type carries no serde so the capability split stays
//! visible at the type level.

use std::collections::BTreeSet;

use super::identity::{IconRef, ItemId, Role};

/// One entry in the navigation preference list.
///
/// `required_roles` is a capability gate evaluated first; `visible` is the
/// user's own preference gate evaluated second. `order` is a plain sort
/// key - not necessarily contiguous, ties resolve by stable input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationItem {
    pub id: ItemId,
    pub name: String,
    pub path: String,
    pub icon: IconRef,
    pub badge: Option<String>,
    /// Empty set means visible to all.
    pub required_roles: BTreeSet<Role>,
    pub visible: bool,
    pub order: i64,
    /// Same invariants recursively; a child never repeats an ancestor id.
    pub children: Vec<NavigationItem>,
}

impl NavigationItem {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        path: impl Into<String>,
        icon: IconRef,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            icon,
            badge: None,
            required_roles: BTreeSet::new(),
            visible: true,
            order: 0,
            children: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.required_roles = roles.into_iter().collect();
        self
    }

    pub fn with_children(mut self, children: Vec<NavigationItem>) -> Self {
        self.children = children;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Stable ascending sort by `order`; equal keys keep input order.
pub fn sort_by_order(items: &mut [NavigationItem]) {
    items.sort_by_key(|item| item.order);
}

/// Drop any child that repeats an ancestor id.
///
/// Lists entering the engine from outside (cache payloads, custom
/// catalogs) may violate the no-cycle invariant; offenders are removed,
/// not propagated.
pub fn strip_ancestor_cycles(items: &mut [NavigationItem]) {
    let mut ancestors = Vec::new();
    for item in items.iter_mut() {
        strip_item(item, &mut ancestors);
    }
}

fn strip_item(item: &mut NavigationItem, ancestors: &mut Vec<ItemId>) {
    ancestors.push(item.id.clone());
    item.children.retain(|child| {
        let keep = !ancestors.contains(&child.id);
        if !keep {
            tracing::warn!(id = %child.id, "dropping child item that repeats an ancestor id");
        }
        keep
    });
    for child in item.children.iter_mut() {
        strip_item(child, ancestors);
    }
    ancestors.pop();
}
