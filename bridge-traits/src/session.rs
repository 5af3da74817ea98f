//! Playback session bridge traits and the types exchanged across them.
//!
//! The playback session is a long-lived host process (or service) that owns
//! decoding, rendering and the play queue. The core never drives audio
//! directly: it binds to the session through a [`SessionConnector`], issues
//! transport commands against the resulting [`SessionTransport`], and reads
//! status/track state back from it. Host applications provide concrete
//! implementations for their platform (Android media browser, iOS remote
//! command center, desktop IPC, ...).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};

/// Reserved track URI the session reports while it advances to the next
/// queue entry.
pub const NEXT_IN_QUEUE_URI: &str = "next-in-queue";

/// Reserved track URI the session reports once the queue is exhausted.
pub const END_OF_QUEUE_URI: &str = "end-of-queue";

/// Whether `uri` is one of the reserved queue-boundary URIs. Matching is
/// exact and case-sensitive on both sides of the bridge.
pub fn is_queue_sentinel(uri: &str) -> bool {
    uri == NEXT_IN_QUEUE_URI || uri == END_OF_QUEUE_URI
}

/// Transport status as reported by the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportStatus {
    Idle,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Error,
}

impl TransportStatus {
    /// Whether playback progress is expected to advance in this status.
    ///
    /// Only `Buffering` and `Playing` count as active; every other status
    /// means no progress updates should be produced.
    pub fn is_active(self) -> bool {
        matches!(self, TransportStatus::Buffering | TransportStatus::Playing)
    }
}

/// Track currently loaded in the session together with its playhead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// Identity of the loaded track.
    pub uri: String,
    /// Last known playback position in milliseconds.
    pub position_ms: u64,
}

impl NowPlaying {
    pub fn new(uri: impl Into<String>, position_ms: u64) -> Self {
        Self {
            uri: uri.into(),
            position_ms,
        }
    }
}

/// Side-channel metadata attached to a load-and-play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayFromUriExtras {
    /// Identifier of the message the audio belongs to.
    pub message_id: i64,
    /// Position in milliseconds at which the session should start playback.
    pub start_position_ms: u64,
}

/// Remote transport capability exposed by a connected playback session.
///
/// Commands are fire-and-forget from the core's point of view: an `Ok(())`
/// means the session accepted the command, not that it has taken effect.
/// Queries must answer from the session's current state without blocking on
/// audio work.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SessionTransport: PlatformSendSync {
    /// Resume playback of the loaded track.
    async fn play(&self) -> Result<()>;

    /// Pause playback without unloading the track.
    async fn pause(&self) -> Result<()>;

    /// Move the playhead of the loaded track.
    async fn seek(&self, position_ms: u64) -> Result<()>;

    /// Load `uri` and start playing it from `extras.start_position_ms`.
    async fn play_from_uri(&self, uri: String, extras: PlayFromUriExtras) -> Result<()>;

    /// Stop playback and reset the session.
    async fn stop(&self) -> Result<()>;

    /// Current transport status.
    async fn status(&self) -> Result<TransportStatus>;

    /// Currently loaded track, or `None` when the session has no metadata.
    async fn current_track(&self) -> Result<Option<NowPlaying>>;

    /// Register a status observer.
    ///
    /// Status changes are delivered in the order the session issued them.
    /// Dropping the returned stream unregisters the observer.
    async fn subscribe_status(&self) -> Result<Box<dyn StatusChangeStream>>;
}

/// Stream of transport status changes.
///
/// Implementations must be cancel-safe: a pending [`next`](Self::next) call
/// may be dropped at any time without losing a status change.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait StatusChangeStream: PlatformSend {
    /// Get the next status change.
    ///
    /// Returns `None` when the session closed the subscription, which the
    /// core treats as loss of the binding.
    async fn next(&mut self) -> Option<TransportStatus>;
}

/// Binding capability used to reach the playback session.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::session::SessionConnector;
///
/// async fn attach(connector: &dyn SessionConnector) -> bridge_traits::error::Result<()> {
///     let transport = connector.connect().await?;
///     let status = transport.status().await?;
///     println!("session is {:?}", status);
///     connector.disconnect().await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SessionConnector: PlatformSendSync {
    /// Bind to the session and return a transport handle on success.
    async fn connect(&self) -> Result<Arc<dyn SessionTransport>>;

    /// Release the binding obtained by [`connect`](Self::connect).
    async fn disconnect(&self) -> Result<()>;
}
