//! # Session Controller
//!
//! UI-facing facade of the session bridge. It owns the connection manager and
//! the playback state store and exposes the four transport commands plus the
//! snapshot stream.
//!
//! ## Usage
//!
//! ```ignore
//! use core_session::{ProgressConfig, SessionController};
//!
//! let controller = SessionController::new(connector, ProgressConfig::default())?;
//! let mut state = controller.playback_state();
//!
//! controller.activate().await?;
//! controller.start_playback("content://voice/12.ogg", 12, 0).await?;
//!
//! while state.changed().await.is_ok() {
//!     let snapshot = state.borrow_and_update().clone();
//!     render_progress(snapshot.track_uri(), snapshot.position_ms());
//! }
//! ```
//!
//! ## Commands While Disconnected
//!
//! Commands issued without a live binding are ignored and return `Ok(())`.
//! Nothing observes as playing in that case, which the snapshot stream
//! already reports. A binding lost since the last call is released first,
//! exactly as the next `activate()` would.

use crate::config::ProgressConfig;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::error::{Result, SessionError};
use crate::lifecycle::LifecycleBinding;
use crate::resolver::{CommandMode, TrackIdentityResolver};
use crate::snapshot::PlaybackStateSnapshot;
use crate::store::PlaybackStateStore;
use bridge_traits::{AudioRouting, SessionConnector, SessionTransport};
use core_runtime::config::CoreConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Facade driving one playback session on behalf of a client.
pub struct SessionController {
    connection: ConnectionManager,
    audio_routing: Option<Arc<dyn AudioRouting>>,
    lifecycle: Mutex<Option<LifecycleBinding>>,
    torn_down: AtomicBool,
}

impl SessionController {
    /// Create a controller bound to `connector`, without lifecycle binding
    /// or event reporting.
    pub fn new(connector: Arc<dyn SessionConnector>, progress: ProgressConfig) -> Result<Self> {
        progress.validate().map_err(SessionError::Config)?;

        Ok(Self {
            connection: ConnectionManager::new(connector, PlaybackStateStore::new(), progress, None),
            audio_routing: None,
            lifecycle: Mutex::new(None),
            torn_down: AtomicBool::new(false),
        })
    }

    /// Create a controller from the host configuration.
    ///
    /// With `features.bind_lifecycle` set the controller follows the
    /// configured `LifecycleObserver` for its whole life, which requires
    /// calling this from within a Tokio runtime.
    pub fn from_config(core: CoreConfig, progress: ProgressConfig) -> Result<Arc<Self>> {
        core.validate()?;
        progress.validate().map_err(SessionError::Config)?;

        let features = core.features;
        let audio_routing = core
            .audio_routing
            .filter(|_| features.route_volume_on_resume);

        let controller = Arc::new(Self {
            connection: ConnectionManager::new(
                core.session_connector,
                PlaybackStateStore::new(),
                progress,
                core.event_bus,
            ),
            audio_routing,
            lifecycle: Mutex::new(None),
            torn_down: AtomicBool::new(false),
        });

        if features.bind_lifecycle {
            let observer = core.lifecycle_observer.ok_or_else(|| {
                SessionError::Config("lifecycle binding enabled without an observer".to_string())
            })?;
            let binding = controller.bind_lifecycle(observer);
            *controller.lifecycle.lock() = Some(binding);
        }

        Ok(controller)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Bind to the playback session. See [`ConnectionManager::activate`].
    pub async fn activate(&self) -> Result<()> {
        if self.is_torn_down() {
            return Err(SessionError::TornDown);
        }
        self.connection.activate().await
    }

    /// Release the binding. Idempotent.
    pub async fn deactivate(&self) {
        self.connection.deactivate().await;
    }

    /// Final release: deactivate, drop the owned lifecycle binding and refuse
    /// any further activation.
    pub async fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let binding = self.lifecycle.lock().take();
        drop(binding);

        self.connection.deactivate().await;
        info!("session controller torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub(crate) async fn route_volume_to_media(&self) {
        let Some(routing) = &self.audio_routing else {
            return;
        };
        if let Err(err) = routing.route_volume_to_media().await {
            warn!(error = %err, "failed to route volume keys to media");
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Play `uri` from `position_ms`, loading it first unless it is the track
    /// already loaded in the session.
    pub async fn start_playback(&self, uri: &str, message_id: i64, position_ms: u64) -> Result<()> {
        let Some(transport) = self.live_transport("start_playback").await else {
            return Ok(());
        };
        let result = TrackIdentityResolver::new(transport.as_ref())
            .start_playback(uri, message_id, position_ms)
            .await;
        finish("start_playback", result)
    }

    /// Pause `uri`. Ignored unless it is the loaded track.
    pub async fn pause_playback(&self, uri: &str) -> Result<()> {
        let Some(transport) = self.live_transport("pause_playback").await else {
            return Ok(());
        };
        let result = TrackIdentityResolver::new(transport.as_ref())
            .pause_playback(uri)
            .await;
        finish("pause_playback", result)
    }

    /// Seek within `uri`. Ignored unless it is the loaded track.
    pub async fn seek_to_position(&self, uri: &str, position_ms: u64) -> Result<()> {
        let Some(transport) = self.live_transport("seek_to_position").await else {
            return Ok(());
        };
        let result = TrackIdentityResolver::new(transport.as_ref())
            .seek_to_position(uri, position_ms)
            .await;
        finish("seek_to_position", result)
    }

    /// Stop the session. Ignored unless `uri` is the loaded track.
    pub async fn stop_playback_and_reset(&self, uri: &str) -> Result<()> {
        let Some(transport) = self.live_transport("stop_playback_and_reset").await else {
            return Ok(());
        };
        let result = TrackIdentityResolver::new(transport.as_ref())
            .stop_playback_and_reset(uri)
            .await;
        finish("stop_playback_and_reset", result)
    }

    async fn live_transport(&self, command: &'static str) -> Option<Arc<dyn SessionTransport>> {
        self.connection.release_lost().await;
        let transport = self.connection.transport();
        if transport.is_none() {
            debug!(command, "command ignored, playback session not connected");
        }
        transport
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Receiver of the playback snapshot stream, starting at the current value.
    pub fn playback_state(&self) -> watch::Receiver<PlaybackStateSnapshot> {
        self.connection.store().subscribe()
    }

    pub fn current_snapshot(&self) -> PlaybackStateSnapshot {
        self.connection.store().current()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.connection_state()
    }
}

fn finish(command: &'static str, result: Result<CommandMode>) -> Result<()> {
    match result {
        Ok(mode) => {
            trace!(command, ?mode, "command dispatched");
            Ok(())
        }
        Err(err) => {
            warn!(command, error = %err, "transport command failed");
            Err(err)
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("connection_state", &self.connection_state())
            .field("lifecycle_bound", &self.lifecycle.lock().is_some())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
