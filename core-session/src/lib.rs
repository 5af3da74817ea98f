//! # Playback Session Bridge
//!
//! Observes and drives an audio playback session owned by another process.
//!
//! ## Overview
//!
//! This crate handles:
//! - Binding to the session in lockstep with the client's visible lifetime
//! - Dispatching transport commands against the loaded track or a new one
//! - Polling playback progress while (and only while) something plays
//! - Publishing the latest playback snapshot to any number of observers
//!
//! ## Components
//!
//! - [`SessionController`]: UI facade and owner of everything below
//! - [`ConnectionManager`]: binding lifecycle (`Disconnected`/`Connecting`/`Connected`)
//! - [`TrackIdentityResolver`]: continue vs. replace decision per command
//! - [`ProgressEventLoop`]: adaptive `Idle`/`Running` poller
//! - [`PlaybackStateStore`]: single-writer snapshot cell
//!
//! Host capabilities (the session transport, lifecycle, volume routing) come
//! from `bridge-traits`; logging, configuration and the event bus from
//! `core-runtime`.

pub mod config;
pub mod connection;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod progress;
pub mod resolver;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod mocks;

pub use config::ProgressConfig;
pub use connection::{ConnectionId, ConnectionManager, ConnectionState, TransportHandle};
pub use controller::SessionController;
pub use error::{Result, SessionError};
pub use lifecycle::LifecycleBinding;
pub use progress::{DriverExit, ProgressEventLoop};
pub use resolver::{CommandMode, TrackIdentityResolver};
pub use snapshot::PlaybackStateSnapshot;
pub use store::PlaybackStateStore;
