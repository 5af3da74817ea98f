//! # Host Bridge Traits
//!
//! Capability contracts that a host platform implements so the core can
//! observe and drive a playback session it does not own.
//!
//! ## Overview
//!
//! This crate defines the contract between the core session bridge and the
//! platform-specific pieces around it. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop, iOS, Android, web).
//!
//! ## Traits
//!
//! ### Playback Session
//! - [`SessionConnector`](session::SessionConnector) - Bind to and release the playback session
//! - [`SessionTransport`](session::SessionTransport) - Transport commands and state queries
//! - [`StatusChangeStream`](session::StatusChangeStream) - Ordered transport status notifications
//!
//! ### Platform Integration
//! - [`LifecycleObserver`](lifecycle::LifecycleObserver) - Client visibility transitions
//! - [`AudioRouting`](lifecycle::AudioRouting) - Route volume keys to the media stream
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Sentinel Track URIs
//!
//! [`NEXT_IN_QUEUE_URI`](session::NEXT_IN_QUEUE_URI) and
//! [`END_OF_QUEUE_URI`](session::END_OF_QUEUE_URI) are reported by the session
//! while it crosses a queue boundary. Both sides of the contract must
//! recognize them identically, so matching goes through
//! [`is_queue_sentinel`](session::is_queue_sentinel) and is not configurable.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Report a lost binding as [`BridgeError::Disconnected`]
//! - Provide actionable error messages
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds on native targets so that a
//! transport can be shared between the controller and its progress driver.
//!
//! ## Examples
//!
//! ### Implementing SessionConnector
//!
//! ```ignore
//! use bridge_traits::session::{SessionConnector, SessionTransport};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! pub struct MediaBrowserConnector {
//!     browser: PlatformMediaBrowser,
//! }
//!
//! #[async_trait]
//! impl SessionConnector for MediaBrowserConnector {
//!     async fn connect(&self) -> Result<Arc<dyn SessionTransport>> {
//!         // Implementation
//!         todo!()
//!     }
//!
//!     async fn disconnect(&self) -> Result<()> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod platform;
pub mod session;

pub use error::BridgeError;

// Re-export commonly used types
pub use lifecycle::{AudioRouting, LifecycleChangeStream, LifecycleObserver, LifecycleState};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use session::{
    is_queue_sentinel, NowPlaying, PlayFromUriExtras, SessionConnector, SessionTransport,
    StatusChangeStream, TransportStatus, END_OF_QUEUE_URI, NEXT_IN_QUEUE_URI,
};
