//! Debounced write-back.
//!
//! A store change marks the single save lane dirty; the coalesced
//! snapshot goes to the remote store after a quiet interval, with a
//! max-interval cap so a constant edit stream cannot defer the save
//! forever. Only the final snapshot of a quiet window is sent, and a
//! snapshot whose fingerprint matches the last successful save is not
//! sent again. Failures are logged, never retried, never rolled back:
//! the next mutation is the recovery path.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use sha2::{Digest, Sha256};

use crate::core::identity::UserId;
use crate::core::item::NavigationItem;
use crate::core::wire::PreferenceRecord;
use crate::remote::{FetchResponse, PreferenceClient, RemoteError};

/// Debounce state for the save lane.
///
/// Deterministic: every transition takes an explicit `now`, so tests pin
/// their own instants.
#[derive(Debug)]
pub struct SaveScheduler {
    debounce: Duration,
    max_interval: Duration,
    dirty_since: Option<Instant>,
    last_event_at: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(debounce: Duration, max_interval: Duration) -> Self {
        Self {
            debounce,
            max_interval: max_interval.max(debounce),
            dirty_since: None,
            last_event_at: None,
        }
    }

    /// A mutation landed; (re)start the quiet interval.
    pub fn mark_dirty_at(&mut self, now: Instant) {
        if self.dirty_since.is_none() {
            self.dirty_since = Some(now);
        }
        self.last_event_at = Some(now);
    }

    /// When the coalesced save should fire, if anything is pending.
    pub fn deadline(&self) -> Option<Instant> {
        let last_event = self.last_event_at?;
        let dirty_since = self.dirty_since.unwrap_or(last_event);
        Some((last_event + self.debounce).min(dirty_since + self.max_interval))
    }

    pub fn is_dirty(&self) -> bool {
        self.last_event_at.is_some()
    }

    /// Consume the pending window (a save fired or was cancelled).
    pub fn clear(&mut self) {
        self.dirty_since = None;
        self.last_event_at = None;
    }
}

/// Coalesced snapshot bound for the remote store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<PreferenceRecord>,
}

impl Snapshot {
    pub fn of(items: &[NavigationItem]) -> Self {
        Self {
            records: items.iter().map(PreferenceRecord::from_item).collect(),
        }
    }

    /// Content fingerprint; identical snapshots are not re-sent.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for record in &self.records {
            if let Ok(bytes) = serde_json::to_vec(record) {
                hasher.update(&bytes);
            }
            hasher.update([0]);
        }
        hasher.finalize().into()
    }
}

/// Operations sent from the session to the sync worker.
pub enum SyncOp {
    /// A store change; coalescable, last snapshot wins.
    Dirty(Snapshot),
    /// The one-per-session initial fetch.
    Fetch,
    /// Stop the lane, cancelling any unfired save.
    Shutdown,
}

/// Results sent back to the session thread.
pub enum RemoteEvent {
    Fetched(Result<FetchResponse, RemoteError>),
    SaveCompleted(Result<(), RemoteError>),
}

/// Handle to the dedicated sync worker thread.
///
/// The worker owns the `PreferenceClient`; fetches and saves share the
/// single lane, so an in-flight fetch delays a due save rather than
/// racing it.
pub struct SyncHandle {
    ops: Sender<SyncOp>,
    events: Receiver<RemoteEvent>,
    worker: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn spawn(
        client: Box<dyn PreferenceClient>,
        user: UserId,
        debounce: Duration,
        max_interval: Duration,
    ) -> io::Result<Self> {
        let (ops_tx, ops_rx) = unbounded();
        let (events_tx, events_rx) = unbounded();
        let worker = thread::Builder::new()
            .name("navsync-writer".into())
            .spawn(move || run_sync_loop(client, user, debounce, max_interval, ops_rx, events_tx))?;
        Ok(Self {
            ops: ops_tx,
            events: events_rx,
            worker: Some(worker),
        })
    }

    pub fn mark_dirty(&self, snapshot: Snapshot) {
        let _ = self.ops.send(SyncOp::Dirty(snapshot));
    }

    pub fn request_fetch(&self) {
        let _ = self.ops.send(SyncOp::Fetch);
    }

    /// Drain results without blocking.
    pub fn try_events(&self) -> Vec<RemoteEvent> {
        self.events.try_iter().collect()
    }

    /// Stop the worker. Any scheduled-but-unfired save is cancelled.
    pub fn shutdown(&mut self) {
        let _ = self.ops.send(SyncOp::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_sync_loop(
    client: Box<dyn PreferenceClient>,
    user: UserId,
    debounce: Duration,
    max_interval: Duration,
    ops: Receiver<SyncOp>,
    events: Sender<RemoteEvent>,
) {
    let mut scheduler = SaveScheduler::new(debounce, max_interval);
    let mut pending: Option<Snapshot> = None;
    let mut last_saved: Option<[u8; 32]> = None;

    loop {
        let message = match scheduler.deadline() {
            Some(deadline) => {
                ops.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => ops.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match message {
            Ok(SyncOp::Dirty(snapshot)) => {
                scheduler.mark_dirty_at(Instant::now());
                pending = Some(snapshot);
            }
            Ok(SyncOp::Fetch) => {
                let result = client.fetch_preferences(&user);
                if let Err(err) = &result {
                    tracing::warn!(user = %user, error = %err, "navigation preference fetch failed");
                }
                let _ = events.send(RemoteEvent::Fetched(result));
            }
            Ok(SyncOp::Shutdown) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {
                scheduler.clear();
                let Some(snapshot) = pending.take() else {
                    continue;
                };
                let fingerprint = snapshot.fingerprint();
                if last_saved == Some(fingerprint) {
                    tracing::debug!(user = %user, "snapshot unchanged since last save, skipping");
                    continue;
                }

                let result = client.save_preferences(&user, &snapshot.records);
                match &result {
                    Ok(()) => {
                        tracing::debug!(
                            user = %user,
                            items = snapshot.records.len(),
                            "navigation preferences saved"
                        );
                        last_saved = Some(fingerprint);
                    }
                    Err(err) => {
                        tracing::warn!(user = %user, error = %err, "navigation preference save failed");
                    }
                }
                let _ = events.send(RemoteEvent::SaveCompleted(result));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IconRef, ItemId};

    fn scheduler() -> SaveScheduler {
        SaveScheduler::new(Duration::from_millis(10), Duration::from_millis(40))
    }

    #[test]
    fn debounce_reschedules_later() {
        let mut scheduler = scheduler();
        let base = Instant::now();

        scheduler.mark_dirty_at(base);
        assert_eq!(scheduler.deadline(), Some(base + Duration::from_millis(10)));

        scheduler.mark_dirty_at(base + Duration::from_millis(5));
        assert_eq!(scheduler.deadline(), Some(base + Duration::from_millis(15)));
    }

    #[test]
    fn max_interval_caps_deadline() {
        let mut scheduler = scheduler();
        let base = Instant::now();

        scheduler.mark_dirty_at(base);
        scheduler.mark_dirty_at(base + Duration::from_millis(35));
        // Quiet interval would push to base+45ms; the cap holds at +40ms.
        assert_eq!(scheduler.deadline(), Some(base + Duration::from_millis(40)));
    }

    #[test]
    fn clear_cancels_the_window() {
        let mut scheduler = scheduler();
        scheduler.mark_dirty_at(Instant::now());
        assert!(scheduler.is_dirty());

        scheduler.clear();
        assert!(!scheduler.is_dirty());
        assert_eq!(scheduler.deadline(), None);
    }

    #[test]
    fn max_interval_never_undercuts_debounce() {
        let scheduler = SaveScheduler::new(Duration::from_millis(50), Duration::from_millis(10));
        assert_eq!(scheduler.max_interval, Duration::from_millis(50));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let item = NavigationItem::new(
            ItemId::new("a").unwrap(),
            "A",
            "/a",
            IconRef::new("gauge").unwrap(),
        );
        let same = Snapshot::of(std::slice::from_ref(&item));
        assert_eq!(same.fingerprint(), Snapshot::of(&[item.clone()]).fingerprint());

        let mut hidden = item;
        hidden.visible = false;
        assert_ne!(same.fingerprint(), Snapshot::of(&[hidden]).fingerprint());
    }
}
