//! Process-visible holder of the latest playback snapshot.
//!
//! Backed by a `tokio::sync::watch` channel: readers always see the most
//! recent value and never a backlog, and the channel starts out holding
//! [`PlaybackStateSnapshot::NONE`].

use crate::snapshot::PlaybackStateSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Single-writer, multi-reader playback state cell.
///
/// Cloning the store clones the writer handle; only the progress loop and
/// the connection manager hold one.
#[derive(Clone)]
pub struct PlaybackStateStore {
    sender: Arc<watch::Sender<PlaybackStateSnapshot>>,
}

impl PlaybackStateStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(PlaybackStateSnapshot::NONE);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Overwrite the current value and notify every receiver.
    pub fn publish(&self, snapshot: PlaybackStateSnapshot) {
        self.sender.send_replace(snapshot);
    }

    /// Publish the canonical "none" snapshot.
    ///
    /// Receivers are only notified when the value actually changes, so
    /// repeated resets do not wake observers.
    pub fn reset(&self) {
        self.sender.send_if_modified(|current| {
            if current.is_none() {
                false
            } else {
                *current = PlaybackStateSnapshot::NONE;
                true
            }
        });
    }

    /// Latest published snapshot.
    pub fn current(&self) -> PlaybackStateSnapshot {
        self.sender.borrow().clone()
    }

    /// New receiver positioned at the current value.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStateSnapshot> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PlaybackStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackStateStore")
            .field("current", &*self.sender.borrow())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
