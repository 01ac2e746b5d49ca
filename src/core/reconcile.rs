//! Reconciliation of local state with the remote preference store.
//!
//! Remote is authoritative for `order` and `visible` - it reflects the
//! last user action that was durably saved. Structural fields fall back
//! record -> local -> registry. Nothing is fabricated and nothing is
//! silently dropped: local-only ids survive a merge with remote data and
//! remote ids unknown locally get registry/default values.

use std::collections::HashMap;

use super::identity::ItemId;
use super::item::{self, NavigationItem};
use super::registry::ItemRegistry;
use super::wire::PreferenceRecord;

/// Merge `local` with the remote records into one authoritative list.
///
/// Postconditions: ids are unique and the list is sorted ascending by
/// `order` (stable on ties). An empty `remote` returns `local` unchanged
/// apart from ordering. Duplicate `menuId`s in `remote` are not an error;
/// the last occurrence wins.
pub fn reconcile(
    local: Vec<NavigationItem>,
    remote: &[PreferenceRecord],
    registry: &ItemRegistry,
) -> Vec<NavigationItem> {
    let mut merged: Vec<NavigationItem> = Vec::with_capacity(remote.len() + local.len());

    if !remote.is_empty() {
        let local_index: HashMap<ItemId, usize> = local
            .iter()
            .enumerate()
            .map(|(at, item)| (item.id.clone(), at))
            .collect();

        let mut slot_of: HashMap<ItemId, usize> = HashMap::new();
        for record in remote {
            let known = local_index.get(&record.menu_id).map(|&at| &local[at]);
            let item = merge_record(record, known, registry);
            match slot_of.get(&record.menu_id) {
                Some(&slot) => merged[slot] = item,
                None => {
                    slot_of.insert(record.menu_id.clone(), merged.len());
                    merged.push(item);
                }
            }
        }

        // Local-only additions (offline edits or not yet synced) are
        // appended after the remote-assigned block, keeping their
        // relative prior order; only their sort key moves.
        let mut next = merged
            .iter()
            .map(|item| item.order)
            .max()
            .map_or(0, |max| max + 1);
        for mut item in local {
            if !slot_of.contains_key(&item.id) {
                item.order = next;
                next += 1;
                merged.push(item);
            }
        }
    } else {
        merged = local;
    }

    item::sort_by_order(&mut merged);
    merged
}

fn merge_record(
    record: &PreferenceRecord,
    local: Option<&NavigationItem>,
    registry: &ItemRegistry,
) -> NavigationItem {
    let mut item = match (local, registry.default_for(&record.menu_id)) {
        (Some(local), _) => local.clone(),
        (None, Some(default)) => default.clone(),
        (None, None) => synthesize(record, registry),
    };

    item.order = record.order;
    item.visible = record.visible;
    if let Some(name) = &record.name {
        item.name = name.clone();
    }
    if let Some(path) = &record.path {
        item.path = path.clone();
    }
    if let Some(icon) = &record.icon_ref {
        item.icon = icon.clone();
    }
    if let Some(badge) = &record.badge {
        item.badge = Some(badge.clone());
    }
    item
}

/// Remote id with neither a local nor a registry counterpart: defined
/// fallbacks for every structural field.
fn synthesize(record: &PreferenceRecord, registry: &ItemRegistry) -> NavigationItem {
    NavigationItem::new(
        record.menu_id.clone(),
        record
            .name
            .clone()
            .unwrap_or_else(|| record.menu_id.to_string()),
        record
            .path
            .clone()
            .unwrap_or_else(|| format!("/{}", record.menu_id)),
        registry.fallback_icon_ref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IconRef, ItemId};
    use crate::core::registry::FALLBACK_ICON;
    use std::collections::BTreeSet;

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    fn local_item(raw: &str, order: i64) -> NavigationItem {
        NavigationItem::new(id(raw), raw.to_uppercase(), format!("/{raw}"), icon("gauge"))
            .with_order(order)
    }

    fn icon(raw: &str) -> IconRef {
        IconRef::new(raw).unwrap()
    }

    fn registry() -> ItemRegistry {
        ItemRegistry::builtin()
    }

    #[test]
    fn empty_remote_is_a_no_op() {
        let local = vec![local_item("a", 0), local_item("b", 1)];
        let merged = reconcile(local.clone(), &[], &registry());
        assert_eq!(merged, local);
    }

    #[test]
    fn remote_wins_order_and_visibility_local_only_appended() {
        // local [a:0, b:1]; remote [a:1, c:0] -> [c:0, a:1, b:2]
        let local = vec![local_item("a", 0), local_item("b", 1)];
        let remote = vec![
            PreferenceRecord::sparse(id("a"), true, 1),
            PreferenceRecord::sparse(id("c"), true, 0),
        ];

        let merged = reconcile(local, &remote, &registry());
        let ids: Vec<&str> = merged.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(merged[0].order, 0);
        assert_eq!(merged[1].order, 1);
        // b is local-only: preserved unchanged apart from position.
        assert_eq!(merged[2].order, 2);
        assert_eq!(merged[2].name, "B");
    }

    #[test]
    fn local_only_items_keep_relative_order() {
        let local = vec![
            local_item("keep1", 0),
            local_item("synced", 1),
            local_item("keep2", 2),
        ];
        let remote = vec![PreferenceRecord::sparse(id("synced"), true, 0)];

        let merged = reconcile(local, &remote, &registry());
        let ids: Vec<&str> = merged.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["synced", "keep1", "keep2"]);
    }

    #[test]
    fn structural_fields_fall_back_to_local_when_absent() {
        let local = vec![local_item("a", 0).with_badge("7")];
        let remote = vec![PreferenceRecord::sparse(id("a"), false, 3)];

        let merged = reconcile(local, &remote, &registry());
        assert_eq!(merged[0].name, "A");
        assert_eq!(merged[0].badge.as_deref(), Some("7"));
        assert_eq!(merged[0].icon, icon("gauge"));
        assert!(!merged[0].visible);
        assert_eq!(merged[0].order, 3);
    }

    #[test]
    fn remote_structural_fields_override_local() {
        let local = vec![local_item("a", 0)];
        let mut record = PreferenceRecord::sparse(id("a"), true, 0);
        record.name = Some("Renamed".into());
        record.icon_ref = Some(icon("cart"));

        let merged = reconcile(local, &[record], &registry());
        assert_eq!(merged[0].name, "Renamed");
        assert_eq!(merged[0].icon, icon("cart"));
        assert_eq!(merged[0].path, "/a", "absent field stays local");
    }

    #[test]
    fn unknown_remote_id_gets_registry_defaults() {
        // "orders" is a builtin: the synthesized item inherits its
        // structural fields, including the role gate.
        let remote = vec![PreferenceRecord::sparse(id("orders"), false, 0)];
        let merged = reconcile(Vec::new(), &remote, &registry());
        assert_eq!(merged[0].path, "/orders");
        assert!(!merged[0].visible);
    }

    #[test]
    fn unknown_remote_id_without_registry_entry_is_synthesized() {
        let remote = vec![PreferenceRecord::sparse(id("plugin-x"), true, 5)];
        let merged = reconcile(Vec::new(), &remote, &registry());
        assert_eq!(merged[0].name, "plugin-x");
        assert_eq!(merged[0].path, "/plugin-x");
        assert_eq!(merged[0].icon.as_str(), FALLBACK_ICON);
        assert!(merged[0].required_roles.is_empty());
    }

    #[test]
    fn duplicate_remote_ids_last_occurrence_wins() {
        let remote = vec![
            PreferenceRecord::sparse(id("a"), true, 0),
            PreferenceRecord::sparse(id("a"), false, 4),
        ];
        let merged = reconcile(Vec::new(), &remote, &registry());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].order, 4);
        assert!(!merged[0].visible);
    }

    #[test]
    fn result_is_unique_and_sorted() {
        let local = vec![local_item("x", 9), local_item("y", 2)];
        let remote = vec![
            PreferenceRecord::sparse(id("y"), true, 7),
            PreferenceRecord::sparse(id("z"), true, 1),
            PreferenceRecord::sparse(id("y"), true, 0),
        ];
        let merged = reconcile(local, &remote, &registry());

        let ids: BTreeSet<&str> = merged.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), merged.len());
        assert!(merged.windows(2).all(|pair| pair[0].order <= pair[1].order));
    }
}
