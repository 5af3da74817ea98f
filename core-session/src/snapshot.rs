//! Playback state snapshots.

use bridge_traits::is_queue_sentinel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable unit of published playback state.
///
/// A snapshot either describes a track being played (its URI and the last
/// known position) or is the canonical [`NONE`](Self::NONE) value, which is
/// both the initial value of the store and the value published whenever
/// nothing is playing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackStateSnapshot {
    track_uri: Option<String>,
    position_ms: u64,
    auto_reset: bool,
}

impl PlaybackStateSnapshot {
    /// The canonical "nothing is playing" snapshot.
    pub const NONE: PlaybackStateSnapshot = PlaybackStateSnapshot {
        track_uri: None,
        position_ms: 0,
        auto_reset: false,
    };

    /// Snapshot for a playing track.
    ///
    /// `auto_reset` is set when `uri` is a queue-boundary sentinel, telling
    /// the UI to reset its per-item progress display instead of treating the
    /// snapshot as content.
    pub fn for_track(uri: impl Into<String>, position_ms: u64) -> Self {
        let uri = uri.into();
        let auto_reset = is_queue_sentinel(&uri);
        Self {
            track_uri: Some(uri),
            position_ms,
            auto_reset,
        }
    }

    pub fn is_none(&self) -> bool {
        self.track_uri.is_none()
    }

    pub fn track_uri(&self) -> Option<&str> {
        self.track_uri.as_deref()
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms)
    }

    pub fn auto_reset(&self) -> bool {
        self.auto_reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_the_default() {
        let none = PlaybackStateSnapshot::default();
        assert_eq!(none, PlaybackStateSnapshot::NONE);
        assert!(none.is_none());
        assert_eq!(none.position_ms(), 0);
        assert!(!none.auto_reset());
    }

    #[test]
    fn content_track_does_not_reset() {
        let snapshot = PlaybackStateSnapshot::for_track("content://voice/7", 1200);
        assert_eq!(snapshot.track_uri(), Some("content://voice/7"));
        assert_eq!(snapshot.position(), Duration::from_millis(1200));
        assert!(!snapshot.auto_reset());
        assert!(!snapshot.is_none());
    }

    #[test]
    fn sentinel_tracks_reset() {
        let end = PlaybackStateSnapshot::for_track("end-of-queue", 250);
        assert!(end.auto_reset());
        assert_eq!(end.position_ms(), 250);

        let next = PlaybackStateSnapshot::for_track("next-in-queue", 0);
        assert!(next.auto_reset());
    }
}
