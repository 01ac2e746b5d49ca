//! Role gate.
//!
//! A capability filter evaluated before the user's own visibility
//! preference. Filtering only - security enforcement belongs to the
//! backend, not the menu.

use std::collections::BTreeSet;

use super::identity::Role;
use super::item::NavigationItem;

/// True if the role set may see the item.
///
/// An empty `required_roles` means visible to all; otherwise any
/// intersection with the user's roles suffices.
pub fn is_visible_for_roles(item: &NavigationItem, user_roles: &BTreeSet<Role>) -> bool {
    item.required_roles.is_empty()
        || item
            .required_roles
            .iter()
            .any(|role| user_roles.contains(role))
}

/// Filter a top-level list by role.
///
/// Non-recursive: children ride along and gate through their own
/// `required_roles` wherever they are rendered.
pub fn filter_by_role(items: &[NavigationItem], user_roles: &BTreeSet<Role>) -> Vec<NavigationItem> {
    items
        .iter()
        .filter(|item| is_visible_for_roles(item, user_roles))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IconRef, ItemId};

    fn item(id: &str, order: i64, required: &[&str]) -> NavigationItem {
        NavigationItem::new(
            ItemId::new(id).unwrap(),
            id.to_uppercase(),
            format!("/{id}"),
            IconRef::new("gauge").unwrap(),
        )
        .with_order(order)
        .with_roles(required.iter().map(|role| Role::new(*role).unwrap()))
    }

    fn roles(names: &[&str]) -> BTreeSet<Role> {
        names.iter().map(|name| Role::new(*name).unwrap()).collect()
    }

    #[test]
    fn empty_required_roles_is_visible_to_all() {
        let dashboard = item("dashboard", 0, &[]);
        assert!(is_visible_for_roles(&dashboard, &roles(&[])));
        assert!(is_visible_for_roles(&dashboard, &roles(&["VIEWER"])));
    }

    #[test]
    fn gated_item_needs_a_matching_role() {
        let team = item("team", 2, &["ADMIN"]);
        assert!(!is_visible_for_roles(&team, &roles(&[])));
        assert!(!is_visible_for_roles(&team, &roles(&["VIEWER"])));
        assert!(is_visible_for_roles(&team, &roles(&["ADMIN"])));
        assert!(is_visible_for_roles(&team, &roles(&["VIEWER", "ADMIN"])));
    }

    #[test]
    fn roleless_user_sees_only_ungated_items() {
        // dashboard:0, products:1, team:2(roles=[ADMIN]); roles=[] keeps
        // only dashboard and products.
        let items = vec![
            item("dashboard", 0, &[]),
            item("products", 1, &[]),
            item("team", 2, &["ADMIN"]),
        ];
        let filtered = filter_by_role(&items, &roles(&[]));
        let ids: Vec<&str> = filtered.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["dashboard", "products"]);
    }

    #[test]
    fn filter_is_not_recursive() {
        let gated_child = item("team", 0, &["ADMIN"]);
        let parent = item("home", 0, &[]).with_children(vec![gated_child]);
        let filtered = filter_by_role(&[parent], &roles(&[]));
        // The parent survives and keeps its gated child; the child gates
        // through its own roles at render time.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].children.len(), 1);
    }

    #[test]
    fn user_visibility_preference_is_independent() {
        let hidden = item("dashboard", 0, &[]).hidden();
        // The role gate passes even though the user hid the item.
        assert!(is_visible_for_roles(&hidden, &roles(&[])));
    }
}
