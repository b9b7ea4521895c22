//! Per-stream state
//!
//! Two independent lock domains:
//!
//! - [`LastValues`]: last pushed frame per `(org_id, path)`. The outer map is
//!   locked only to find or insert a path slot; each slot then has its own
//!   locks, so pushes to different paths never wait on each other.
//! - [`FieldSubscriptions`]: field-narrowing subscriptions per
//!   `(org_id, path)`, changed on subscribe and on subscriber cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::frame::FrameJsonCache;

/// Last-value slot of one `(org_id, path)`
#[derive(Default)]
pub(super) struct PathSlot {
    last: RwLock<Option<FrameJsonCache>>,

    /// Held for a whole push so pushes to one path publish in order
    order: Mutex<()>,
}

impl PathSlot {
    /// Serialize a push against other pushes to this path
    pub(super) async fn lock_order(&self) -> MutexGuard<'_, ()> {
        self.order.lock().await
    }

    /// Store a new frame, returning the previous one
    pub(super) async fn replace(&self, frame: FrameJsonCache) -> Option<FrameJsonCache> {
        self.last.write().await.replace(frame)
    }

    pub(super) async fn get(&self) -> Option<FrameJsonCache> {
        self.last.read().await.clone()
    }
}

/// Last pushed frame per organization and path
#[derive(Default)]
pub(super) struct LastValues {
    slots: RwLock<HashMap<i64, HashMap<String, Arc<PathSlot>>>>,
}

impl LastValues {
    /// Get the slot for a path, creating it if needed
    pub(super) async fn slot(&self, org_id: i64, path: &str) -> Arc<PathSlot> {
        if let Some(slot) = self.existing(org_id, path).await {
            return slot;
        }

        let mut slots = self.slots.write().await;
        Arc::clone(
            slots
                .entry(org_id)
                .or_default()
                .entry(path.to_string())
                .or_default(),
        )
    }

    async fn existing(&self, org_id: i64, path: &str) -> Option<Arc<PathSlot>> {
        let slots = self.slots.read().await;
        slots.get(&org_id)?.get(path).cloned()
    }

    /// Last frame pushed to a path
    pub(super) async fn get(&self, org_id: i64, path: &str) -> Option<FrameJsonCache> {
        let slot = self.existing(org_id, path).await?;
        slot.get().await
    }

    /// All cached frames of an organization, ordered by path
    pub(super) async fn snapshot(&self, org_id: i64) -> Vec<(String, FrameJsonCache)> {
        let slots: Vec<(String, Arc<PathSlot>)> = {
            let slots = self.slots.read().await;
            match slots.get(&org_id) {
                Some(paths) => paths
                    .iter()
                    .map(|(path, slot)| (path.clone(), Arc::clone(slot)))
                    .collect(),
                None => return Vec::new(),
            }
        };

        let mut frames = Vec::with_capacity(slots.len());
        for (path, slot) in slots {
            // A slot exists before its first frame is stored
            if let Some(frame) = slot.get().await {
                frames.push((path, frame));
            }
        }
        frames.sort_by(|a, b| a.0.cmp(&b.0));
        frames
    }
}

/// A subscriber's request for a subset of a path's fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSubscription {
    /// Channel the narrowed frames are published to
    pub channel: String,
    /// Requested field names, in request order
    pub fields: Vec<String>,
    id: u64,
}

/// Field subscriptions per organization and path, keyed by channel
///
/// Never locked across an `.await`.
#[derive(Default)]
pub(super) struct FieldSubscriptions {
    subs: SyncMutex<HashMap<(i64, String), HashMap<String, FieldSubscription>>>,
    next_id: AtomicU64,
}

impl FieldSubscriptions {
    /// Register or overwrite the subscription of `channel` on a path
    ///
    /// Returns the registration id that must be presented to remove it.
    pub(super) fn insert(
        &self,
        org_id: i64,
        path: &str,
        channel: &str,
        fields: Vec<String>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sub = FieldSubscription {
            channel: channel.to_string(),
            fields,
            id,
        };

        let mut subs = self.subs.lock().unwrap_or_else(PoisonError::into_inner);
        subs.entry((org_id, path.to_string()))
            .or_default()
            .insert(channel.to_string(), sub);
        id
    }

    /// Remove a subscription if it is still registration `id`
    ///
    /// A later subscribe on the same channel and path overwrites the entry
    /// with a new id; removing with the stale id then leaves it alone.
    pub(super) fn remove(&self, org_id: i64, path: &str, channel: &str, id: u64) -> bool {
        let mut subs = self.subs.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (org_id, path.to_string());

        let Some(channels) = subs.get_mut(&key) else {
            return false;
        };
        if channels.get(channel).map(|s| s.id) != Some(id) {
            return false;
        }

        channels.remove(channel);
        if channels.is_empty() {
            subs.remove(&key);
        }
        true
    }

    /// Snapshot of the subscriptions of a path, ordered by channel
    pub(super) fn for_path(&self, org_id: i64, path: &str) -> Vec<FieldSubscription> {
        let subs = self.subs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<FieldSubscription> = subs
            .get(&(org_id, path.to_string()))
            .map(|channels| channels.values().cloned().collect())
            .unwrap_or_default();
        found.sort_by(|a, b| a.channel.cmp(&b.channel));
        found
    }
}

/// Split a subscription path into base path and field selector
///
/// The selector is the last `/`-separated segment, a list of field names
/// joined by `separator`. Returns `None` when the path has no usable
/// selector; the whole path is then the base path.
pub(super) fn parse_field_selector(path: &str, separator: char) -> Option<(&str, Vec<String>)> {
    let (base, selector) = path.rsplit_once('/')?;
    // `/value` has no base path to narrow
    if base.is_empty() {
        return None;
    }

    let fields: Vec<String> = selector
        .split(separator)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if fields.is_empty() {
        return None;
    }

    Some((base, fields))
}
