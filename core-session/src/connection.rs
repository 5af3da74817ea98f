//! # Connection Management
//!
//! Owns the binding to the playback session. A binding is a single resource
//! made of the transport handle, its status subscription and the progress
//! driver task fed by that subscription; it is acquired as a whole in
//! [`ConnectionManager::activate`] and released as a whole in
//! [`ConnectionManager::deactivate`].
//!
//! ## States
//!
//! ```text
//!                 activate()               connect ok
//!  Disconnected ─────────────> Connecting ────────────> Connected(handle)
//!       ^                          │                          │
//!       │   connect failed /       │                          │ deactivate(),
//!       └──── deactivate() ────────┘                          │ lost binding
//!       └─────────────────────────────────────────────────────┘
//! ```
//!
//! A failed connect is logged, reported as an event and returned to the
//! caller. It is never retried here; the next `activate()` is the retry.

use crate::config::ProgressConfig;
use crate::error::{Result, SessionError};
use crate::progress::{DriverExit, ProgressEventLoop};
use crate::store::PlaybackStateStore;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{SessionConnector, SessionTransport, TransportStatus};
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Identifier of one binding, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared, read-only view of a live transport.
#[derive(Clone)]
pub struct TransportHandle {
    id: ConnectionId,
    transport: Arc<dyn SessionTransport>,
}

impl TransportHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn transport(&self) -> &Arc<dyn SessionTransport> {
        &self.transport
    }
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Externally visible connection state.
#[derive(Debug, Clone)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected(TransportHandle),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }
}

/// A live binding: transport, status subscription (owned by the driver) and
/// the driver task itself.
struct SessionBinding {
    handle: TransportHandle,
    shutdown: CancellationToken,
    driver: JoinHandle<DriverExit>,
}

impl SessionBinding {
    /// The driver only finishes on its own when the session closed the
    /// status subscription.
    fn is_lost(&self) -> bool {
        self.driver.is_finished()
    }
}

enum Binding {
    Disconnected,
    Connecting {
        id: ConnectionId,
        cancel: CancellationToken,
    },
    Connected(SessionBinding),
}

impl Binding {
    fn is_lost(&self) -> bool {
        matches!(self, Binding::Connected(session) if session.is_lost())
    }
}

/// Sole owner of the session binding.
pub struct ConnectionManager {
    connector: Arc<dyn SessionConnector>,
    store: PlaybackStateStore,
    config: ProgressConfig,
    events: Option<EventBus>,
    binding: Mutex<Binding>,
}

impl ConnectionManager {
    pub fn new(
        connector: Arc<dyn SessionConnector>,
        store: PlaybackStateStore,
        config: ProgressConfig,
        events: Option<EventBus>,
    ) -> Self {
        Self {
            connector,
            store,
            config,
            events,
            binding: Mutex::new(Binding::Disconnected),
        }
    }

    /// Bind to the session if not already bound (or binding).
    ///
    /// On success the status observer is registered and the current status
    /// is evaluated immediately, so a session that is already playing starts
    /// producing snapshots right away.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConnectionFailed`] when binding fails. The
    /// manager is `Disconnected` afterwards.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> Result<()> {
        self.release_lost().await;

        let (id, cancel) = {
            let mut binding = self.binding.lock();
            if !matches!(*binding, Binding::Disconnected) {
                debug!("activate ignored, session already bound");
                return Ok(());
            }
            let id = ConnectionId::new();
            let cancel = CancellationToken::new();
            *binding = Binding::Connecting {
                id,
                cancel: cancel.clone(),
            };
            (id, cancel)
        };

        debug!(connection_id = %id, "connecting to playback session");
        self.emit(SessionEvent::Connecting);

        let attached = tokio::select! {
            result = self.attach(id) => result,
            _ = cancel.cancelled() => {
                debug!(connection_id = %id, "activation cancelled");
                return Ok(());
            }
        };

        let (session, status) = match attached {
            Ok(attached) => attached,
            Err(err) => {
                {
                    let mut binding = self.binding.lock();
                    if matches!(&*binding, Binding::Connecting { id: current, .. } if *current == id)
                    {
                        *binding = Binding::Disconnected;
                    }
                }
                warn!(connection_id = %id, error = %err, "failed to connect to playback session");
                self.emit(SessionEvent::ConnectionFailed {
                    message: err.to_string(),
                });
                return Err(SessionError::ConnectionFailed(err.to_string()));
            }
        };

        // deactivate() may have run while the last attach step was in flight
        let stale = {
            let mut binding = self.binding.lock();
            let pending = matches!(
                &*binding,
                Binding::Connecting { id: current, cancel } if *current == id && !cancel.is_cancelled()
            );
            if pending {
                *binding = Binding::Connected(session);
                None
            } else {
                Some(session)
            }
        };

        if let Some(session) = stale {
            debug!(connection_id = %id, "releasing binding attached after deactivation");
            self.release(session).await;
            self.disconnect_connector().await;
            return Ok(());
        }

        info!(connection_id = %id, ?status, "connected to playback session");
        self.emit(SessionEvent::Connected { status });
        Ok(())
    }

    /// Release the binding. Safe to call any number of times from any state.
    ///
    /// When this returns the progress loop has exited and the store holds
    /// the "none" snapshot.
    #[instrument(skip(self))]
    pub async fn deactivate(&self) {
        let previous = std::mem::replace(&mut *self.binding.lock(), Binding::Disconnected);

        match previous {
            Binding::Disconnected => {
                debug!("deactivate ignored, session not bound");
                return;
            }
            Binding::Connecting { id, cancel } => {
                debug!(connection_id = %id, "cancelling pending connection");
                cancel.cancel();
            }
            Binding::Connected(session) => self.release(session).await,
        }

        self.disconnect_connector().await;
        info!("disconnected from playback session");
        self.emit(SessionEvent::Disconnected);
    }

    /// Transport of the live binding, if any.
    pub fn transport(&self) -> Option<Arc<dyn SessionTransport>> {
        match &*self.binding.lock() {
            Binding::Connected(session) if !session.is_lost() => {
                Some(Arc::clone(&session.handle.transport))
            }
            _ => None,
        }
    }

    /// Current state. A binding whose subscription was closed by the session
    /// reports `Disconnected`.
    pub fn connection_state(&self) -> ConnectionState {
        match &*self.binding.lock() {
            Binding::Disconnected => ConnectionState::Disconnected,
            Binding::Connecting { .. } => ConnectionState::Connecting,
            Binding::Connected(session) if session.is_lost() => ConnectionState::Disconnected,
            Binding::Connected(session) => ConnectionState::Connected(session.handle.clone()),
        }
    }

    pub fn store(&self) -> &PlaybackStateStore {
        &self.store
    }

    async fn attach(&self, id: ConnectionId) -> BridgeResult<(SessionBinding, TransportStatus)> {
        let transport = self.connector.connect().await?;

        let subscribed = async {
            let statuses = transport.subscribe_status().await?;
            let status = transport.status().await?;
            Ok::<_, bridge_traits::BridgeError>((statuses, status))
        }
        .await;

        let (statuses, status) = match subscribed {
            Ok(subscribed) => subscribed,
            Err(err) => {
                self.disconnect_connector().await;
                return Err(err);
            }
        };

        let shutdown = CancellationToken::new();
        let progress = ProgressEventLoop::new(
            Arc::clone(&transport),
            self.store.clone(),
            &self.config,
            self.events.clone(),
        );
        let driver = tokio::spawn(progress.run(statuses, status, shutdown.clone()));

        let session = SessionBinding {
            handle: TransportHandle { id, transport },
            shutdown,
            driver,
        };
        Ok((session, status))
    }

    /// Cancel the driver and wait for it to exit.
    async fn release(&self, session: SessionBinding) {
        let id = session.handle.id;
        session.shutdown.cancel();

        match session.driver.await {
            Ok(exit) => debug!(connection_id = %id, ?exit, "progress driver exited"),
            Err(err) => {
                warn!(connection_id = %id, error = %err, "progress driver failed");
                self.store.reset();
            }
        }
    }

    /// Release a binding whose status subscription was closed by the session.
    /// No-op unless the binding is lost.
    pub(crate) async fn release_lost(&self) {
        let lost = {
            let mut binding = self.binding.lock();
            if binding.is_lost() {
                Some(std::mem::replace(&mut *binding, Binding::Disconnected))
            } else {
                None
            }
        };

        if let Some(Binding::Connected(session)) = lost {
            let id = session.handle.id;
            self.release(session).await;
            self.disconnect_connector().await;
            info!(connection_id = %id, "released lost playback session binding");
            self.emit(SessionEvent::Disconnected);
        }
    }

    async fn disconnect_connector(&self) {
        if let Err(err) = self.connector.disconnect().await {
            warn!(error = %err, "failed to release playback session binding");
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(bus) = &self.events {
            bus.emit(CoreEvent::Session(event)).ok();
        }
    }
}
