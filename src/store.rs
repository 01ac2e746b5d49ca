//! The preference store: in-memory authoritative ordered list with
//! synchronous observer notification.
//!
//! Constructor-initialized and explicitly subscribed - no process-wide
//! provider, no implicit global lifetime. Mutations go through a single
//! `apply` entry point; applications that change nothing notify nobody
//! and never reach the write-back path.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::core::identity::{ItemId, Role};
use crate::core::item::{self, NavigationItem};
use crate::core::ops::{ItemPatch, StoreOp};
use crate::core::registry::ItemRegistry;

/// Handle returned by `subscribe`; pass back to `unsubscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn Fn(&[NavigationItem])>;

pub struct PreferenceStore {
    items: Vec<NavigationItem>,
    registry: Arc<ItemRegistry>,
    roles: BTreeSet<Role>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
}

impl PreferenceStore {
    pub fn new(
        registry: Arc<ItemRegistry>,
        roles: BTreeSet<Role>,
        mut items: Vec<NavigationItem>,
    ) -> Self {
        item::sort_by_order(&mut items);
        Self {
            items,
            registry,
            roles,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    pub fn registry(&self) -> &ItemRegistry {
        self.registry.as_ref()
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Register an observer. Every effective mutation calls it
    /// synchronously with the new full list.
    pub fn subscribe(&mut self, callback: impl Fn(&[NavigationItem]) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(existing, _)| *existing != id);
    }

    /// Replace the list wholesale - the reconciliation entry point.
    /// Returns true (and notifies) only if the list actually changed.
    pub fn set_items(&mut self, mut items: Vec<NavigationItem>) -> bool {
        item::sort_by_order(&mut items);
        if items == self.items {
            return false;
        }
        self.items = items;
        self.notify();
        true
    }

    /// Apply one mutation. Returns true (and notifies) only if the list
    /// changed.
    pub fn apply(&mut self, op: StoreOp) -> bool {
        let changed = match op {
            StoreOp::Add(new_item) => self.add_item(new_item),
            StoreOp::Remove(id) => self.remove_item(&id),
            StoreOp::Update { id, patch } => self.update_item(&id, &patch),
            StoreOp::SetVisibility { id, visible } => self.set_visibility_of(&id, visible),
            StoreOp::ToggleVisibility(id) => self.toggle_visibility_of(&id),
            StoreOp::Reorder(ordered_ids) => self.reorder_items(&ordered_ids),
            StoreOp::Reset => self.reset_items(),
        };
        if changed {
            self.notify();
        }
        changed
    }

    pub fn add(&mut self, new_item: NavigationItem) -> bool {
        self.apply(StoreOp::Add(new_item))
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        self.apply(StoreOp::Remove(id))
    }

    pub fn update(&mut self, id: ItemId, patch: ItemPatch) -> bool {
        self.apply(StoreOp::Update { id, patch })
    }

    pub fn set_visibility(&mut self, id: ItemId, visible: bool) -> bool {
        self.apply(StoreOp::SetVisibility { id, visible })
    }

    pub fn toggle_visibility(&mut self, id: ItemId) -> bool {
        self.apply(StoreOp::ToggleVisibility(id))
    }

    pub fn reorder(&mut self, ordered_ids: Vec<ItemId>) -> bool {
        self.apply(StoreOp::Reorder(ordered_ids))
    }

    pub fn reset_to_default(&mut self) -> bool {
        self.apply(StoreOp::Reset)
    }

    fn add_item(&mut self, mut new_item: NavigationItem) -> bool {
        if self.items.iter().any(|item| item.id == new_item.id) {
            // Idempotent insert.
            return false;
        }
        item::strip_ancestor_cycles(std::slice::from_mut(&mut new_item));
        self.items.push(new_item);
        item::sort_by_order(&mut self.items);
        true
    }

    fn remove_item(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != *id);
        self.items.len() != before
    }

    fn update_item(&mut self, id: &ItemId, patch: &ItemPatch) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == *id) else {
            return false;
        };
        if !patch.apply_to(item) {
            return false;
        }
        item::sort_by_order(&mut self.items);
        true
    }

    fn set_visibility_of(&mut self, id: &ItemId, visible: bool) -> bool {
        match self.items.iter_mut().find(|item| item.id == *id) {
            Some(item) if item.visible != visible => {
                item.visible = visible;
                true
            }
            _ => false,
        }
    }

    fn toggle_visibility_of(&mut self, id: &ItemId) -> bool {
        match self.items.iter_mut().find(|item| item.id == *id) {
            Some(item) => {
                item.visible = !item.visible;
                true
            }
            None => false,
        }
    }

    /// Named ids take `order = index`; everything else gets trailing
    /// orders continuing from the sequence length, in prior relative
    /// order. Reordering to the current arrangement changes nothing.
    fn reorder_items(&mut self, ordered_ids: &[ItemId]) -> bool {
        let mut desired: HashMap<&ItemId, i64> = HashMap::new();
        for (index, id) in ordered_ids.iter().enumerate() {
            desired.insert(id, index as i64);
        }

        let mut next = ordered_ids.len() as i64;
        let mut changed = false;
        for item in self.items.iter_mut() {
            let target = match desired.get(&item.id) {
                Some(&order) => order,
                None => {
                    let order = next;
                    next += 1;
                    order
                }
            };
            if item.order != target {
                item.order = target;
                changed = true;
            }
        }
        if changed {
            item::sort_by_order(&mut self.items);
        }
        changed
    }

    fn reset_items(&mut self) -> bool {
        let defaults = self.registry.defaults_for_roles(&self.roles);
        if defaults == self.items {
            return false;
        }
        self.items = defaults;
        true
    }

    fn notify(&self) {
        for (_, callback) in &self.subscribers {
            callback(&self.items);
        }
    }
}
