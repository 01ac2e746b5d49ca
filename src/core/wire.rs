//! Wire and storage projections of a navigation item.
//!
//! `PreferenceRecord` is the remote store's partial view keyed by
//! `menuId`; `CachedItem` is the device-local storage schema. Both carry
//! only the symbolic icon ref, never the resolved capability.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::identity::{IconRef, ItemId, Role};
use super::item::NavigationItem;

/// Partial projection of a navigation item exchanged with the remote
/// store.
///
/// `visible` and `order` are always present - they record the last user
/// action that was durably saved. The structural fields are optional so
/// the remote store may carry only ordering/visibility while name, path,
/// icon and badge stay locally authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    pub menu_id: ItemId,
    pub visible: bool,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<IconRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl PreferenceRecord {
    /// Full projection, used for saves.
    pub fn from_item(item: &NavigationItem) -> Self {
        Self {
            menu_id: item.id.clone(),
            visible: item.visible,
            order: item.order,
            name: Some(item.name.clone()),
            path: Some(item.path.clone()),
            icon_ref: Some(item.icon.clone()),
            badge: item.badge.clone(),
        }
    }

    /// Ordering/visibility only; structural fields stay local.
    pub fn sparse(menu_id: ItemId, visible: bool, order: i64) -> Self {
        Self {
            menu_id,
            visible,
            order,
            name: None,
            path: None,
            icon_ref: None,
            badge: None,
        }
    }
}

/// Storage form for the device-local cache: one JSON array of these under
/// a scoped key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedItem {
    pub id: ItemId,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub is_visible: bool,
    pub order: i64,
    pub icon_ref: IconRef,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required_roles: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CachedItem>,
}

impl CachedItem {
    pub fn from_item(item: &NavigationItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            path: item.path.clone(),
            badge: item.badge.clone(),
            is_visible: item.visible,
            order: item.order,
            icon_ref: item.icon.clone(),
            required_roles: item.required_roles.clone(),
            children: item.children.iter().map(Self::from_item).collect(),
        }
    }

    pub fn into_item(self) -> NavigationItem {
        NavigationItem {
            id: self.id,
            name: self.name,
            path: self.path,
            icon: self.icon_ref,
            badge: self.badge,
            required_roles: self.required_roles,
            visible: self.is_visible,
            order: self.order,
            children: self.children.into_iter().map(Self::into_item).collect(),
        }
    }
}
