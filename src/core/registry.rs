//! Item registry: the compiled-in navigation catalog and the symbolic
//! icon capability table.
//!
//! Items reference icons by name so the data model stays serializable and
//! independent of the rendering layer; the registry turns a name into a
//! renderable capability, falling back to a defined default for names it
//! does not know.

use std::collections::{BTreeMap, BTreeSet};

use super::identity::{IconRef, ItemId, Role};
use super::item::{self, NavigationItem};
use super::roles;

/// A renderable icon capability, looked up by symbolic name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Icon {
    pub name: &'static str,
    pub css_class: &'static str,
}

/// Every unknown ref resolves to this name.
pub const FALLBACK_ICON: &str = "circle";

const FALLBACK: Icon = Icon {
    name: FALLBACK_ICON,
    css_class: "icon-circle",
};

pub struct ItemRegistry {
    builtins: Vec<NavigationItem>,
    icons: BTreeMap<String, Icon>,
}

impl ItemRegistry {
    /// A registry over a custom catalog. The catalog is sanitized the same
    /// way external lists are: ancestor cycles stripped, sorted by order.
    pub fn new(mut builtins: Vec<NavigationItem>, mut icons: BTreeMap<String, Icon>) -> Self {
        item::strip_ancestor_cycles(&mut builtins);
        item::sort_by_order(&mut builtins);
        icons.entry(FALLBACK_ICON.to_string()).or_insert(FALLBACK);
        Self { builtins, icons }
    }

    /// The compiled-in admin console catalog.
    pub fn builtin() -> Self {
        Self::new(builtin_items(), builtin_icons())
    }

    /// Resolve a symbolic ref to a capability. Unknown refs get the
    /// fallback capability, never an absent one.
    pub fn resolve_icon(&self, icon: &IconRef) -> Icon {
        match self.icons.get(icon.as_str()) {
            Some(found) => *found,
            None => {
                tracing::debug!(icon = %icon, "unknown icon ref, using fallback");
                self.fallback_icon()
            }
        }
    }

    pub fn fallback_icon(&self) -> Icon {
        self.icons.get(FALLBACK_ICON).copied().unwrap_or(FALLBACK)
    }

    pub fn fallback_icon_ref(&self) -> IconRef {
        IconRef::from_static(FALLBACK_ICON)
    }

    /// Default values for a builtin id, used as the last fallback tier
    /// during reconciliation.
    pub fn default_for(&self, id: &ItemId) -> Option<&NavigationItem> {
        self.builtins.iter().find(|item| item.id == *id)
    }

    pub fn defaults(&self) -> Vec<NavigationItem> {
        self.builtins.clone()
    }

    /// Defaults a given role set is allowed to see.
    pub fn defaults_for_roles(&self, user_roles: &BTreeSet<Role>) -> Vec<NavigationItem> {
        roles::filter_by_role(&self.builtins, user_roles)
    }
}

fn builtin_items() -> Vec<NavigationItem> {
    let admin = Role::from_static("ADMIN");
    vec![
        entry("dashboard", "Dashboard", "gauge", 0),
        entry("analytics", "Analytics", "chart-line", 1),
        entry("products", "Products", "box", 2),
        entry("orders", "Orders", "cart", 3),
        entry("customers", "Customers", "users", 4),
        entry("chat", "Chat", "message", 5),
        entry("logs", "Logs", "scroll", 6),
        entry("cache", "Cache Inspector", "database", 7).with_roles([admin.clone()]),
        entry("team", "Team", "shield", 8).with_roles([admin.clone()]),
        entry("settings", "Settings", "gear", 9).with_roles([admin]),
    ]
}

fn entry(id: &'static str, name: &'static str, icon: &'static str, order: i64) -> NavigationItem {
    NavigationItem::new(
        ItemId::from_static(id),
        name,
        format!("/{id}"),
        IconRef::from_static(icon),
    )
    .with_order(order)
}

fn builtin_icons() -> BTreeMap<String, Icon> {
    let mut table = BTreeMap::new();
    for icon in [
        Icon { name: "gauge", css_class: "icon-gauge" },
        Icon { name: "chart-line", css_class: "icon-chart-line" },
        Icon { name: "box", css_class: "icon-box" },
        Icon { name: "cart", css_class: "icon-cart" },
        Icon { name: "users", css_class: "icon-users" },
        Icon { name: "message", css_class: "icon-message" },
        Icon { name: "scroll", css_class: "icon-scroll" },
        Icon { name: "database", css_class: "icon-database" },
        Icon { name: "shield", css_class: "icon-shield" },
        Icon { name: "gear", css_class: "icon-gear" },
        FALLBACK,
    ] {
        table.insert(icon.name.to_string(), icon);
    }
    table
}
