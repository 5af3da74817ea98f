//! Recording fakes of the host bridges used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::{
    AudioRouting, BridgeError, LifecycleChangeStream, LifecycleObserver, LifecycleState,
    NowPlaying, PlayFromUriExtras, SessionConnector, SessionTransport, StatusChangeStream,
    TransportStatus,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Let spawned tasks run; with a paused clock this also advances time.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

// ============================================================================
// Transport
// ============================================================================

/// Command received by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Seek(u64),
    PlayFromUri(String, PlayFromUriExtras),
    Stop,
}

struct TransportState {
    status: TransportStatus,
    track: Option<NowPlaying>,
    commands: Vec<Command>,
    subscribers: Vec<mpsc::UnboundedSender<TransportStatus>>,
}

/// Scriptable session transport. Commands are recorded but never change
/// the reported status or track; tests script those explicitly.
pub struct FakeTransport {
    state: Mutex<TransportState>,
    status_queries: AtomicUsize,
    fail_commands: AtomicBool,
}

impl FakeTransport {
    pub fn new(status: TransportStatus, track: Option<NowPlaying>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TransportState {
                status,
                track,
                commands: Vec::new(),
                subscribers: Vec::new(),
            }),
            status_queries: AtomicUsize::new(0),
            fail_commands: AtomicBool::new(false),
        })
    }

    pub fn playing(uri: &str, position_ms: u64) -> Arc<Self> {
        Self::new(TransportStatus::Playing, Some(NowPlaying::new(uri, position_ms)))
    }

    /// Change the status and notify every registered observer.
    pub fn set_status(&self, status: TransportStatus) {
        let mut state = self.state.lock().unwrap();
        state.status = status;
        state
            .subscribers
            .retain(|subscriber| subscriber.send(status).is_ok());
    }

    pub fn set_track(&self, track: Option<NowPlaying>) {
        self.state.lock().unwrap().track = track;
    }

    pub fn set_position(&self, position_ms: u64) {
        if let Some(track) = self.state.lock().unwrap().track.as_mut() {
            track.position_ms = position_ms;
        }
    }

    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    /// Close every status subscription, as a dying session would.
    pub fn close_subscriptions(&self) {
        self.state.lock().unwrap().subscribers.clear();
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.lock().unwrap().commands.clear();
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    /// Number of observers whose stream is still alive.
    pub fn subscriber_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscribers
            .iter()
            .filter(|subscriber| !subscriber.is_closed())
            .count()
    }

    fn record(&self, command: Command) -> Result<()> {
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(format!("{:?} rejected", command)));
        }
        self.state.lock().unwrap().commands.push(command);
        Ok(())
    }
}

#[async_trait]
impl SessionTransport for FakeTransport {
    async fn play(&self) -> Result<()> {
        self.record(Command::Play)
    }

    async fn pause(&self) -> Result<()> {
        self.record(Command::Pause)
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        self.record(Command::Seek(position_ms))
    }

    async fn play_from_uri(&self, uri: String, extras: PlayFromUriExtras) -> Result<()> {
        self.record(Command::PlayFromUri(uri, extras))
    }

    async fn stop(&self) -> Result<()> {
        self.record(Command::Stop)
    }

    async fn status(&self) -> Result<TransportStatus> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().status)
    }

    async fn current_track(&self) -> Result<Option<NowPlaying>> {
        Ok(self.state.lock().unwrap().track.clone())
    }

    async fn subscribe_status(&self) -> Result<Box<dyn StatusChangeStream>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state.lock().unwrap().subscribers.push(sender);
        Ok(Box::new(ChannelStatusStream(receiver)))
    }
}

struct ChannelStatusStream(mpsc::UnboundedReceiver<TransportStatus>);

#[async_trait]
impl StatusChangeStream for ChannelStatusStream {
    async fn next(&mut self) -> Option<TransportStatus> {
        self.0.recv().await
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Connector handing out one shared [`FakeTransport`].
pub struct FakeConnector {
    transport: Arc<FakeTransport>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    fail: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeConnector {
    pub fn new(transport: Arc<FakeTransport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            gate: Mutex::new(None),
        })
    }

    /// Make every later `connect()` wait for a permit on the returned gate.
    pub fn hold_connects(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn SessionTransport>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(BridgeError::NotAvailable("session service refused binding".to_string()));
        }
        Ok(self.transport.clone())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle observer fed through a channel.
pub struct FakeLifecycle {
    initial: LifecycleState,
    changes: Mutex<Option<mpsc::UnboundedReceiver<LifecycleState>>>,
}

impl FakeLifecycle {
    pub fn new(initial: LifecycleState) -> (Arc<Self>, mpsc::UnboundedSender<LifecycleState>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let observer = Arc::new(Self {
            initial,
            changes: Mutex::new(Some(receiver)),
        });
        (observer, sender)
    }
}

#[async_trait]
impl LifecycleObserver for FakeLifecycle {
    async fn get_state(&self) -> Result<LifecycleState> {
        Ok(self.initial)
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        let receiver = self
            .changes
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BridgeError::NotAvailable("already subscribed".to_string()))?;
        Ok(Box::new(ChannelLifecycleStream(receiver)))
    }
}

struct ChannelLifecycleStream(mpsc::UnboundedReceiver<LifecycleState>);

#[async_trait]
impl LifecycleChangeStream for ChannelLifecycleStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        self.0.recv().await
    }
}

/// Volume routing that counts invocations.
#[derive(Default)]
pub struct FakeAudioRouting {
    routed: AtomicUsize,
}

impl FakeAudioRouting {
    pub fn routed(&self) -> usize {
        self.routed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioRouting for FakeAudioRouting {
    async fn route_volume_to_media(&self) -> Result<()> {
        self.routed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
