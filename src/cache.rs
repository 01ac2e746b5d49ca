//! Device-local persistent cache of the last-known list.
//!
//! A synchronous key/value store seeds the preference store before the
//! remote round-trip completes (fast paint). Failures never cross this
//! boundary: unreadable payloads fall back to registry defaults, write
//! failures are logged and absorbed.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::identity::Role;
use crate::core::item::{self, NavigationItem};
use crate::core::registry::ItemRegistry;
use crate::core::wire::CachedItem;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("malformed cache payload for {key:?}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous string key/value store scoped to the device.
pub trait CacheStore {
    /// Raw payload for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;
    /// Store a raw payload. Errors surface so `save` can log them.
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// Ephemeral in-memory store for tests and anonymous sessions.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key under a directory, written atomically.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache file unreadable");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        fs::write(temp.path(), value.as_bytes())?;
        temp.persist(self.path_for(key)).map_err(|err| err.error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Parse the cached list under `key`. `Ok(None)` means nothing cached.
///
/// The payload is sanitized on the way in: duplicate ids collapse (last
/// occurrence wins), ancestor cycles are stripped, and the result is
/// sorted. Malformed payloads are an error here; callers fall back to
/// defaults.
pub fn load(cache: &dyn CacheStore, key: &str) -> Result<Option<Vec<NavigationItem>>, CacheError> {
    let Some(raw) = cache.get(key) else {
        return Ok(None);
    };
    let cached: Vec<CachedItem> = serde_json::from_str(&raw).map_err(|source| CacheError::Parse {
        key: key.to_string(),
        source,
    })?;

    let mut items: Vec<NavigationItem> = cached.into_iter().map(CachedItem::into_item).collect();
    dedup_by_id(&mut items);
    item::strip_ancestor_cycles(&mut items);
    item::sort_by_order(&mut items);
    Ok(Some(items))
}

/// Seed list for session start: cached state when parseable, else
/// role-filtered registry defaults. Never fails past this boundary.
pub fn load_or_default(
    cache: &dyn CacheStore,
    key: &str,
    registry: &ItemRegistry,
    user_roles: &BTreeSet<Role>,
) -> Vec<NavigationItem> {
    match load(cache, key) {
        Ok(Some(items)) => items,
        Ok(None) => registry.defaults_for_roles(user_roles),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding unreadable navigation cache");
            registry.defaults_for_roles(user_roles)
        }
    }
}

/// Persist the list under `key`, storing only symbolic icon refs.
///
/// Write failures are logged and absorbed; a failing device store never
/// disturbs in-memory state.
pub fn save(cache: &mut dyn CacheStore, key: &str, items: &[NavigationItem]) {
    let cached: Vec<CachedItem> = items.iter().map(CachedItem::from_item).collect();
    let payload = match serde_json::to_string(&cached) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(key, error = %err, "could not serialize navigation cache");
            return;
        }
    };
    if let Err(err) = cache.set(key, &payload) {
        tracing::warn!(key, error = %err, "navigation cache write failed");
    }
}

fn dedup_by_id(items: &mut Vec<NavigationItem>) {
    let mut seen = HashSet::new();
    let mut keep = vec![false; items.len()];
    for (at, item) in items.iter().enumerate().rev() {
        keep[at] = seen.insert(item.id.clone());
    }
    if keep.iter().all(|flag| *flag) {
        return;
    }
    tracing::warn!("dropping duplicate item ids from cached list");
    let mut at = 0;
    items.retain(|_| {
        let kept = keep[at];
        at += 1;
        kept
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IconRef, ItemId};

    fn nav_item(raw: &str, order: i64) -> NavigationItem {
        NavigationItem::new(
            ItemId::new(raw).unwrap(),
            raw.to_uppercase(),
            format!("/{raw}"),
            IconRef::new("gauge").unwrap(),
        )
        .with_order(order)
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut cache = MemoryCache::new();
        let items = vec![
            nav_item("a", 0).hidden(),
            nav_item("b", 3).with_badge("7"),
            nav_item("custom", 9),
        ];

        save(&mut cache, "nav", &items);
        let loaded = load(&cache, "nav").unwrap().unwrap();

        assert_eq!(loaded.len(), items.len());
        for (got, want) in loaded.iter().zip(items.iter()) {
            assert_eq!(got.id, want.id);
            assert_eq!(got.order, want.order);
            assert_eq!(got.visible, want.visible);
            assert_eq!(got.icon, want.icon, "symbolic icon names survive");
        }
    }

    #[test]
    fn missing_key_is_none() {
        let cache = MemoryCache::new();
        assert!(load(&cache, "nav").unwrap().is_none());
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        let mut cache = MemoryCache::new();
        cache.set("nav", "{not json").unwrap();
        assert!(load(&cache, "nav").is_err());
    }

    #[test]
    fn load_or_default_recovers_from_garbage() {
        let mut cache = MemoryCache::new();
        cache.set("nav", "[{\"bogus\":true}]").unwrap();
        let registry = ItemRegistry::builtin();
        let roles = BTreeSet::new();

        let items = load_or_default(&cache, "nav", &registry, &roles);
        assert_eq!(items, registry.defaults_for_roles(&roles));
    }

    #[test]
    fn duplicate_cached_ids_collapse_last_wins() {
        let mut cache = MemoryCache::new();
        let items = vec![nav_item("a", 0), nav_item("a", 5).hidden()];
        save(&mut cache, "nav", &items);

        let loaded = load(&cache, "nav").unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].order, 5);
        assert!(!loaded[0].visible);
    }

    #[test]
    fn file_cache_round_trips_and_tolerates_missing_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = FileCache::new(dir.path().join("nested"));

        assert!(cache.get("nav").is_none());
        save(&mut cache, "nav", &[nav_item("a", 0)]);
        let loaded = load(&cache, "nav").unwrap().unwrap();
        assert_eq!(loaded[0].id.as_str(), "a");

        cache.remove("nav").unwrap();
        assert!(cache.get("nav").is_none());
    }

    #[test]
    fn save_failure_is_absorbed() {
        struct RefusingCache;
        impl CacheStore for RefusingCache {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }
            fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            }
            fn remove(&mut self, _key: &str) -> io::Result<()> {
                Ok(())
            }
        }

        let mut cache = RefusingCache;
        // Must not panic or propagate.
        save(&mut cache, "nav", &[nav_item("a", 0)]);
    }
}
