//! # Progress Event Loop
//!
//! Turns the pull-based session API into a push-style snapshot stream.
//!
//! While the transport reports an active status the loop polls it on a fixed
//! period and publishes a [`PlaybackStateSnapshot`] per tick. As soon as a
//! tick (or a status notification) observes an inactive status, the loop
//! publishes [`PlaybackStateSnapshot::NONE`] and goes idle, so nothing is
//! polled while nothing plays.
//!
//! ## State Machine
//!
//! ```text
//!            status active / start()
//!   ┌──────┐ ─────────────────────────> ┌─────────┐
//!   │ Idle │                            │ Running │──┐ tick: publish
//!   └──────┘ <───────────────────────── └─────────┘<─┘
//!            inactive status, missing
//!            metadata, query error,
//!            shutdown
//! ```
//!
//! ## Serialization
//!
//! Status notifications, ticks and shutdown are all handled by a single task
//! through one `select!`, so a "stop" can never interleave with a tick's
//! publish. A tick that already started runs to completion; shutdown is
//! observed before the next one is scheduled.

use crate::config::ProgressConfig;
use crate::snapshot::PlaybackStateSnapshot;
use crate::store::PlaybackStateStore;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{SessionTransport, StatusChangeStream, TransportStatus};
use core_runtime::events::{CoreEvent, EventBus, ProgressEvent, SessionEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Why [`ProgressEventLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The owning connection cancelled the loop.
    Shutdown,
    /// The session closed the status subscription.
    SubscriptionClosed,
}

/// Live poll schedule. Dropping it cancels every tick not yet fired.
struct PollHandle {
    interval: Interval,
}

enum PollState {
    Idle,
    Running(PollHandle),
}

impl PollState {
    fn is_running(&self) -> bool {
        matches!(self, PollState::Running(_))
    }

    /// Resolves on the next scheduled tick; never resolves while idle.
    async fn next_tick(&mut self) {
        match self {
            PollState::Running(handle) => {
                handle.interval.tick().await;
            }
            PollState::Idle => std::future::pending().await,
        }
    }
}

/// Progress poller bound to one connection.
pub struct ProgressEventLoop {
    transport: Arc<dyn SessionTransport>,
    store: PlaybackStateStore,
    period: Duration,
    events: Option<EventBus>,
    state: PollState,
}

impl ProgressEventLoop {
    pub fn new(
        transport: Arc<dyn SessionTransport>,
        store: PlaybackStateStore,
        config: &ProgressConfig,
        events: Option<EventBus>,
    ) -> Self {
        Self {
            transport,
            store,
            period: config.poll_interval().max(Duration::from_millis(1)),
            events,
            state: PollState::Idle,
        }
    }

    /// Whether a poll schedule is live.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Drive the loop until `shutdown` fires or the status stream ends.
    ///
    /// `initial` is the status read right after attaching, so a session that
    /// is already playing starts producing snapshots without waiting for a
    /// notification. The store holds the "none" snapshot when this returns.
    pub async fn run(
        mut self,
        mut statuses: Box<dyn StatusChangeStream>,
        initial: TransportStatus,
        shutdown: CancellationToken,
    ) -> DriverExit {
        self.notify(initial);

        let exit = loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break DriverExit::Shutdown,

                status = statuses.next() => match status {
                    Some(status) => self.notify(status),
                    None => break DriverExit::SubscriptionClosed,
                },

                _ = self.state.next_tick() => self.tick().await,
            }
        };

        self.stop();

        if exit == DriverExit::SubscriptionClosed {
            warn!("Playback session closed the status subscription");
            self.emit(CoreEvent::Session(SessionEvent::ConnectionLost));
        }

        exit
    }

    /// Single entry point for status changes.
    pub fn notify(&mut self, status: TransportStatus) {
        trace!(?status, "transport status changed");
        if status.is_active() {
            self.start();
        } else {
            self.stop();
        }
    }

    fn start(&mut self) {
        if self.state.is_running() {
            return;
        }

        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.state = PollState::Running(PollHandle { interval });

        debug!(period_ms = self.period.as_millis() as u64, "progress updates started");
        self.emit(CoreEvent::Progress(ProgressEvent::Started));
    }

    fn stop(&mut self) {
        if let PollState::Running(_) = std::mem::replace(&mut self.state, PollState::Idle) {
            debug!("progress updates stopped");
            self.emit(CoreEvent::Progress(ProgressEvent::Stopped));
        }
        self.store.reset();
    }

    /// One poll iteration.
    pub async fn tick(&mut self) {
        match self.poll().await {
            Ok(Some(snapshot)) => {
                trace!(position_ms = snapshot.position_ms(), "progress tick");
                self.store.publish(snapshot);
            }
            Ok(None) => self.stop(),
            Err(err) => {
                warn!(error = %err, "progress query failed");
                self.stop();
            }
        }
    }

    async fn poll(&self) -> BridgeResult<Option<PlaybackStateSnapshot>> {
        let status = self.transport.status().await?;
        if !status.is_active() {
            return Ok(None);
        }

        match self.transport.current_track().await? {
            Some(track) => Ok(Some(PlaybackStateSnapshot::for_track(track.uri, track.position_ms))),
            None => {
                debug!(?status, "active status without track metadata");
                Ok(None)
            }
        }
    }

    fn emit(&self, event: CoreEvent) {
        if let Some(bus) = &self.events {
            bus.emit(event).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, NowPlaying, PlayFromUriExtras};
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    struct ScriptedTransport {
        state: Mutex<(TransportStatus, Option<NowPlaying>, bool)>,
        queries: Mutex<usize>,
    }

    impl ScriptedTransport {
        fn new(status: TransportStatus, track: Option<NowPlaying>) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new((status, track, false)),
                queries: Mutex::new(0),
            })
        }

        fn set(&self, status: TransportStatus, track: Option<NowPlaying>) {
            let mut state = self.state.lock();
            state.0 = status;
            state.1 = track;
        }

        fn fail_queries(&self) {
            self.state.lock().2 = true;
        }

        fn query_count(&self) -> usize {
            *self.queries.lock()
        }
    }

    #[async_trait]
    impl SessionTransport for ScriptedTransport {
        async fn play(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn seek(&self, _position_ms: u64) -> BridgeResult<()> {
            Ok(())
        }

        async fn play_from_uri(&self, _uri: String, _extras: PlayFromUriExtras) -> BridgeResult<()> {
            Ok(())
        }

        async fn stop(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn status(&self) -> BridgeResult<TransportStatus> {
            *self.queries.lock() += 1;
            let state = self.state.lock();
            if state.2 {
                return Err(BridgeError::OperationFailed("query failed".to_string()));
            }
            Ok(state.0)
        }

        async fn current_track(&self) -> BridgeResult<Option<NowPlaying>> {
            Ok(self.state.lock().1.clone())
        }

        async fn subscribe_status(&self) -> BridgeResult<Box<dyn StatusChangeStream>> {
            Err(BridgeError::NotAvailable("scripted".to_string()))
        }
    }

    struct ChannelStream(mpsc::UnboundedReceiver<TransportStatus>);

    #[async_trait]
    impl StatusChangeStream for ChannelStream {
        async fn next(&mut self) -> Option<TransportStatus> {
            self.0.recv().await
        }
    }

    fn status_channel() -> (mpsc::UnboundedSender<TransportStatus>, Box<dyn StatusChangeStream>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Box::new(ChannelStream(rx)))
    }

    fn progress_loop(
        transport: Arc<ScriptedTransport>,
        store: &PlaybackStateStore,
        events: Option<EventBus>,
    ) -> ProgressEventLoop {
        ProgressEventLoop::new(transport, store.clone(), &ProgressConfig::default(), events)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_publishes_sentinel_with_auto_reset() {
        let transport = ScriptedTransport::new(
            TransportStatus::Playing,
            Some(NowPlaying::new("end-of-queue", 250)),
        );
        let store = PlaybackStateStore::new();
        let mut progress = progress_loop(transport, &store, None);

        progress.notify(TransportStatus::Playing);
        progress.tick().await;

        let snapshot = store.current();
        assert_eq!(snapshot.track_uri(), Some("end-of-queue"));
        assert_eq!(snapshot.position_ms(), 250);
        assert!(snapshot.auto_reset());
        assert!(progress.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_active_notifications_keep_one_schedule() {
        let transport = ScriptedTransport::new(TransportStatus::Playing, None);
        let store = PlaybackStateStore::new();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let mut progress = progress_loop(transport, &store, Some(bus));

        progress.notify(TransportStatus::Buffering);
        progress.notify(TransportStatus::Playing);
        progress.notify(TransportStatus::Playing);

        assert!(progress.is_running());
        assert_eq!(
            events.try_recv().unwrap(),
            CoreEvent::Progress(ProgressEvent::Started)
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_metadata_stops_loop() {
        let transport = ScriptedTransport::new(
            TransportStatus::Playing,
            Some(NowPlaying::new("track-a", 10)),
        );
        let store = PlaybackStateStore::new();
        let mut progress = progress_loop(transport.clone(), &store, None);

        progress.notify(TransportStatus::Playing);
        progress.tick().await;
        assert!(!store.current().is_none());

        transport.set(TransportStatus::Playing, None);
        progress.tick().await;

        assert!(store.current().is_none());
        assert!(!progress.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_stops_loop() {
        let transport = ScriptedTransport::new(
            TransportStatus::Playing,
            Some(NowPlaying::new("track-a", 10)),
        );
        let store = PlaybackStateStore::new();
        let mut progress = progress_loop(transport.clone(), &store, None);

        progress.notify(TransportStatus::Playing);
        progress.tick().await;
        transport.fail_queries();
        progress.tick().await;

        assert!(store.current().is_none());
        assert!(!progress.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_while_active_and_goes_idle() {
        let transport = ScriptedTransport::new(
            TransportStatus::Playing,
            Some(NowPlaying::new("track-a", 0)),
        );
        let store = PlaybackStateStore::new();
        let progress = progress_loop(transport.clone(), &store, None);
        let (tx, statuses) = status_channel();
        let shutdown = CancellationToken::new();

        let driver = tokio::spawn(progress.run(statuses, TransportStatus::Playing, shutdown.clone()));

        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.current().track_uri(), Some("track-a"));

        transport.set(TransportStatus::Playing, Some(NowPlaying::new("track-a", 120)));
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.current().position_ms(), 120);

        transport.set(TransportStatus::Paused, Some(NowPlaying::new("track-a", 120)));
        tx.send(TransportStatus::Paused).unwrap();
        time::sleep(Duration::from_millis(10)).await;
        assert!(store.current().is_none());

        // Idle: no further queries
        let queries = transport.query_count();
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(transport.query_count(), queries);

        shutdown.cancel();
        assert_eq!(driver.await.unwrap(), DriverExit::Shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactive_initial_status_never_polls() {
        let transport = ScriptedTransport::new(TransportStatus::Paused, None);
        let store = PlaybackStateStore::new();
        let progress = progress_loop(transport.clone(), &store, None);
        let (_tx, statuses) = status_channel();
        let shutdown = CancellationToken::new();

        let driver = tokio::spawn(progress.run(statuses, TransportStatus::Paused, shutdown.clone()));
        time::sleep(Duration::from_millis(200)).await;

        assert_eq!(transport.query_count(), 0);
        shutdown.cancel();
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_subscription_reports_loss() {
        let transport = ScriptedTransport::new(
            TransportStatus::Playing,
            Some(NowPlaying::new("track-a", 0)),
        );
        let store = PlaybackStateStore::new();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let progress = progress_loop(transport, &store, Some(bus));
        let (tx, statuses) = status_channel();

        let driver = tokio::spawn(progress.run(
            statuses,
            TransportStatus::Playing,
            CancellationToken::new(),
        ));
        time::sleep(Duration::from_millis(10)).await;
        drop(tx);

        assert_eq!(driver.await.unwrap(), DriverExit::SubscriptionClosed);
        assert!(store.current().is_none());

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![
                CoreEvent::Progress(ProgressEvent::Started),
                CoreEvent::Progress(ProgressEvent::Stopped),
                CoreEvent::Session(SessionEvent::ConnectionLost),
            ]
        );
    }
}
