//! Client Lifecycle and Audio Routing
//!
//! Lets the core follow the visibility of the host component that owns it.

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};

/// Lifecycle state of the host component driving the session client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Component became visible
    Started,
    /// Component is in the foreground and interactive
    Resumed,
    /// Component lost focus but is still visible
    Paused,
    /// Component is no longer visible
    Stopped,
    /// Component is being destroyed
    Destroyed,
}

/// Lifecycle observer trait
///
/// Notifies the core about visibility transitions of the client so it can:
/// - Bind to the playback session when the client becomes visible
/// - Release the binding when the client is hidden
/// - Drop every observer when the client is destroyed
///
/// # Platform Support
///
/// - **iOS**: UIViewController appearance callbacks
/// - **Android**: Activity lifecycle callbacks
/// - **Desktop**: Window show/hide events
/// - **Web**: Page Visibility API
///
/// # Example
///
/// ```ignore
/// use bridge_traits::lifecycle::{LifecycleObserver, LifecycleState};
///
/// async fn follow(observer: &dyn LifecycleObserver) -> Result<()> {
///     let mut stream = observer.subscribe_changes().await?;
///
///     while let Some(state) = stream.next().await {
///         match state {
///             LifecycleState::Started => connect(),
///             LifecycleState::Stopped => disconnect(),
///             _ => {}
///         }
///     }
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LifecycleObserver: PlatformSendSync {
    /// Get current lifecycle state
    async fn get_state(&self) -> Result<LifecycleState>;

    /// Subscribe to lifecycle state changes
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle state changes
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LifecycleChangeStream: PlatformSend {
    /// Get the next lifecycle state update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleState>;
}

/// Audio routing capability
///
/// While the client is in the foreground, hardware volume keys should adjust
/// the media stream rather than the ringer or system volume.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioRouting: PlatformSendSync {
    /// Route volume controls to the media stream
    async fn route_volume_to_media(&self) -> Result<()>;
}
