//! The ordered asset collection and its shared handle.
//!
//! [`AssetStore`] is the single source of truth for which assets exist and
//! what state they are in. The pipeline reaches it through [`SharedStore`],
//! whose closure-based accessors make every record update atomic and keep
//! the lock from ever being held across an `.await`.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use crate::asset::{AssetId, AssetState, CompressedImage, ImageAsset};

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Change notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    Added(AssetId),
    StateChanged { id: AssetId, state: AssetState },
    Removed(AssetId),
    Cleared,
}

/// Handed out when a compression attempt starts; completions present it back.
#[derive(Debug, Clone)]
pub struct CompressTicket {
    pub id: AssetId,
    pub attempt: u64,
    pub original: Arc<[u8]>,
}

/// Insertion-ordered collection of assets.
#[derive(Debug)]
pub struct AssetStore {
    assets: Vec<ImageAsset>,
    events: broadcast::Sender<AssetEvent>,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl AssetStore {
    /// Create an empty store whose event channel buffers `event_capacity`
    /// notifications per subscriber.
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            assets: Vec::new(),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AssetEvent> {
        self.events.subscribe()
    }

    /// Append an asset.
    pub fn add(&mut self, asset: ImageAsset) {
        let id = asset.id();
        debug_assert!(self.find(id).is_none(), "duplicate asset id {id}");
        self.assets.push(asset);
        self.publish(AssetEvent::Added(id));
    }

    pub fn find(&self, id: AssetId) -> Option<&ImageAsset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    fn find_mut(&mut self, id: AssetId) -> Option<&mut ImageAsset> {
        self.assets.iter_mut().find(|a| a.id() == id)
    }

    /// Remove by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: AssetId) -> Option<ImageAsset> {
        let index = self.assets.iter().position(|a| a.id() == id)?;
        let removed = self.assets.remove(index);
        self.publish(AssetEvent::Removed(id));
        Some(removed)
    }

    /// All assets in insertion order.
    pub fn all(&self) -> &[ImageAsset] {
        &self.assets
    }

    /// Drop every asset, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.assets.len();
        self.assets.clear();
        if count > 0 {
            self.publish(AssetEvent::Cleared);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Ids of assets whose state matches, in store order.
    pub fn ids_in_state(&self, pred: impl Fn(AssetState) -> bool) -> Vec<AssetId> {
        self.assets
            .iter()
            .filter(|a| pred(a.state()))
            .map(ImageAsset::id)
            .collect()
    }

    /// Move an asset into `Compressing` and hand back what the encoder needs.
    ///
    /// Returns `None` if the asset does not exist.
    pub fn begin_compression(&mut self, id: AssetId) -> Option<CompressTicket> {
        let asset = self.find_mut(id)?;
        asset.attempt += 1;
        asset.set_state(AssetState::Compressing);
        let ticket = CompressTicket {
            id,
            attempt: asset.attempt,
            original: Arc::clone(asset.original()),
        };
        self.publish(AssetEvent::StateChanged {
            id,
            state: AssetState::Compressing,
        });
        Some(ticket)
    }

    /// Record a successful attempt.
    ///
    /// Returns `false` without touching anything if the asset is gone or a
    /// newer attempt has started since `ticket` was issued.
    pub fn complete_compression(&mut self, ticket: &CompressTicket, result: CompressedImage) -> bool {
        let Some(asset) = self.current_attempt(ticket) else {
            return false;
        };
        asset.set_compressed(result);
        self.publish(AssetEvent::StateChanged {
            id: ticket.id,
            state: AssetState::Compressed,
        });
        true
    }

    /// Record a failed attempt. Prior compressed data is kept.
    ///
    /// Same staleness rules as [`complete_compression`](Self::complete_compression).
    pub fn fail_compression(&mut self, ticket: &CompressTicket) -> bool {
        let Some(asset) = self.current_attempt(ticket) else {
            return false;
        };
        asset.set_state(AssetState::Failed);
        self.publish(AssetEvent::StateChanged {
            id: ticket.id,
            state: AssetState::Failed,
        });
        true
    }

    fn current_attempt(&mut self, ticket: &CompressTicket) -> Option<&mut ImageAsset> {
        match self.find_mut(ticket.id) {
            Some(asset) if asset.attempt == ticket.attempt => Some(asset),
            Some(_) => {
                debug!(id = %ticket.id, attempt = ticket.attempt, "Superseded compression result dropped");
                None
            }
            None => {
                debug!(id = %ticket.id, "Compression finished for removed asset");
                None
            }
        }
    }

    fn publish(&self, event: AssetEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Cloneable handle to a store shared by the pipeline components.
#[derive(Debug, Clone, Default)]
pub struct SharedStore(Arc<Mutex<AssetStore>>);

impl SharedStore {
    pub fn new(store: AssetStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&AssetStore) -> R) -> R {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access. All of `f`'s mutations land together.
    pub fn write<R>(&self, f: impl FnOnce(&mut AssetStore) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
