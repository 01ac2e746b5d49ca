//! Session wiring.
//!
//! On start the device cache seeds the store synchronously (fast paint)
//! and the one-per-session remote fetch goes out in the background. From
//! then on every mutation mirrors to the cache synchronously and marks
//! the debounced writer dirty. Mutations issued while the initial fetch
//! is in flight are queued and replayed on top of the reconciled list.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::{self, CacheStore};
use crate::config::SyncConfig;
use crate::core::identity::{ItemId, Role, UserId};
use crate::core::item::NavigationItem;
use crate::core::ops::{ItemPatch, StoreOp};
use crate::core::reconcile::reconcile;
use crate::core::registry::ItemRegistry;
use crate::core::wire::PreferenceRecord;
use crate::remote::PreferenceClient;
use crate::store::{PreferenceStore, SubscriberId};
use crate::writer::{RemoteEvent, Snapshot, SyncHandle};

/// Authenticated user context from the identity provider.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user: UserId,
    pub roles: BTreeSet<Role>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchState {
    Idle,
    Pending,
    Done,
}

pub struct NavSession<C: CacheStore> {
    store: PreferenceStore,
    cache: C,
    cache_key: String,
    sync: Option<SyncHandle>,
    fetch: FetchState,
    queued: Vec<StoreOp>,
}

impl<C: CacheStore> NavSession<C> {
    /// Start a session.
    ///
    /// Without an identity (or without a client) the remote leg is
    /// skipped entirely; cache persistence still happens.
    pub fn start(
        config: &SyncConfig,
        registry: Arc<ItemRegistry>,
        identity: Option<Identity>,
        cache: C,
        client: Option<Box<dyn PreferenceClient>>,
    ) -> Self {
        let roles = identity
            .as_ref()
            .map(|identity| identity.roles.clone())
            .unwrap_or_default();
        let cache_key = config.cache_key(identity.as_ref().map(|identity| &identity.user));
        let items = cache::load_or_default(&cache, &cache_key, &registry, &roles);
        let store = PreferenceStore::new(registry, roles, items);

        let mut session = Self {
            store,
            cache,
            cache_key,
            sync: None,
            fetch: FetchState::Idle,
            queued: Vec::new(),
        };

        if let (Some(identity), Some(client)) = (identity, client) {
            match SyncHandle::spawn(
                client,
                identity.user,
                config.debounce(),
                config.max_interval(),
            ) {
                Ok(handle) => {
                    handle.request_fetch();
                    session.sync = Some(handle);
                    session.fetch = FetchState::Pending;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "could not start sync worker; staying local-only");
                }
            }
        }

        session
    }

    pub fn items(&self) -> &[NavigationItem] {
        self.store.items()
    }

    pub fn registry(&self) -> &ItemRegistry {
        self.store.registry()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// True until the initial fetch has resolved (or was skipped).
    pub fn initial_fetch_pending(&self) -> bool {
        self.fetch == FetchState::Pending
    }

    pub fn subscribe(&mut self, callback: impl Fn(&[NavigationItem]) + 'static) -> SubscriberId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.store.unsubscribe(id);
    }

    pub fn add(&mut self, item: NavigationItem) {
        self.mutate(StoreOp::Add(item));
    }

    pub fn remove(&mut self, id: ItemId) {
        self.mutate(StoreOp::Remove(id));
    }

    pub fn update(&mut self, id: ItemId, patch: ItemPatch) {
        self.mutate(StoreOp::Update { id, patch });
    }

    pub fn set_visibility(&mut self, id: ItemId, visible: bool) {
        self.mutate(StoreOp::SetVisibility { id, visible });
    }

    /// Flip an item's visibility preference.
    ///
    /// Queued as the resolved `SetVisibility` so a replay after
    /// reconciliation re-asserts the user's intent instead of blindly
    /// flipping again.
    pub fn toggle_visibility(&mut self, id: ItemId) {
        let resolved = self
            .store
            .items()
            .iter()
            .find(|item| item.id == id)
            .map(|item| !item.visible);
        if let Some(visible) = resolved {
            self.mutate(StoreOp::SetVisibility { id, visible });
        }
    }

    /// Apply the final desired ordering from the drag gesture handler.
    pub fn reorder(&mut self, ordered_ids: Vec<ItemId>) {
        self.mutate(StoreOp::Reorder(ordered_ids));
    }

    /// Discard all customization and return to role-filtered defaults.
    pub fn reset_to_default(&mut self) {
        self.mutate(StoreOp::Reset);
    }

    /// Drain sync worker results. Call once per event-loop turn.
    pub fn process_remote_events(&mut self) {
        let events = match &self.sync {
            Some(sync) => sync.try_events(),
            None => return,
        };
        for event in events {
            match event {
                RemoteEvent::Fetched(Ok(response)) => {
                    self.apply_remote(response.preferences);
                }
                RemoteEvent::Fetched(Err(_)) => {
                    // Already logged by the worker; whatever local state
                    // is in the store stays authoritative.
                    self.fetch = FetchState::Done;
                    self.queued.clear();
                }
                RemoteEvent::SaveCompleted(_) => {}
            }
        }
    }

    /// Stop the sync worker, cancelling any unfired save.
    pub fn shutdown(&mut self) {
        if let Some(mut sync) = self.sync.take() {
            sync.shutdown();
        }
    }

    fn mutate(&mut self, op: StoreOp) {
        let replay = (self.fetch == FetchState::Pending).then(|| op.clone());
        if self.store.apply(op) {
            if let Some(op) = replay {
                self.queued.push(op);
            }
            self.after_change();
        }
    }

    fn apply_remote(&mut self, records: Vec<PreferenceRecord>) {
        self.fetch = FetchState::Done;
        let merged = reconcile(
            self.store.items().to_vec(),
            &records,
            self.store.registry(),
        );
        let mut changed = self.store.set_items(merged);
        for op in std::mem::take(&mut self.queued) {
            changed |= self.store.apply(op);
        }
        if changed {
            self.after_change();
        }
    }

    fn after_change(&mut self) {
        cache::save(&mut self.cache, &self.cache_key, self.store.items());
        if let Some(sync) = &self.sync {
            sync.mark_dirty(Snapshot::of(self.store.items()));
        }
    }
}
