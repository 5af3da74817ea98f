//! # Core Configuration Module
//!
//! Provides configuration management for the session bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host bridges the core needs. It enforces fail-fast
//! validation so a missing capability is reported at startup instead of on
//! the first `activate()`.
//!
//! ## Required Dependencies
//!
//! - `SessionConnector` - Required to bind to the playback session
//!
//! ## Optional Dependencies
//!
//! - `LifecycleObserver` - Drive activation from the host component lifecycle
//! - `AudioRouting` - Route volume keys to media while resumed
//! - `EventBus` - Publish connection and progress lifecycle events
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .session_connector(Arc::new(MediaBrowserConnector::new()))
//!     .lifecycle_observer(Arc::new(ActivityLifecycle::new()))
//!     .bind_lifecycle(true)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! The builder validates all required dependencies and provides actionable error
//! messages when capabilities are missing:
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // This will panic with an actionable error message
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing session connector");
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{AudioRouting, LifecycleObserver, SessionConnector};
use std::sync::Arc;

/// Core configuration for the session bridge.
///
/// This struct holds the bridges required to build a session controller.
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Binding capability for the playback session (required)
    pub session_connector: Arc<dyn SessionConnector>,

    /// Host component lifecycle observer (optional)
    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,

    /// Volume routing capability (optional)
    pub audio_routing: Option<Arc<dyn AudioRouting>>,

    /// Event bus receiving session lifecycle events (optional)
    pub event_bus: Option<EventBus>,

    /// Features flags
    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("session_connector", &"SessionConnector { ... }")
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .field(
                "audio_routing",
                &self.audio_routing.as_ref().map(|_| "AudioRouting { ... }"),
            )
            .field("event_bus", &self.event_bus)
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional functionality.
///
/// Each flag requires its corresponding bridge to be provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Activate/deactivate automatically from the host lifecycle (requires LifecycleObserver)
    pub bind_lifecycle: bool,

    /// Route volume keys to media when the client resumes (requires AudioRouting)
    pub route_volume_on_resume: bool,
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// Every enabled feature flag must have its bridge available.
    pub fn validate(&self) -> Result<()> {
        if self.features.bind_lifecycle && self.lifecycle_observer.is_none() {
            return Err(Error::Config(
                "Lifecycle binding enabled but no LifecycleObserver provided. \
                 Disable the feature or inject a LifecycleObserver implementation."
                    .to_string(),
            ));
        }

        if self.features.route_volume_on_resume && self.audio_routing.is_none() {
            return Err(Error::Config(
                "Volume routing enabled but no AudioRouting provided. \
                 Disable the feature or inject an AudioRouting implementation."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn session_connector_missing_error() -> Error {
    Error::capability_missing(
        "SessionConnector",
        "SessionConnector implementation is required to reach the playback session. \
         Android: wrap a MediaBrowser connection. \
         iOS: wrap the shared audio session controller. \
         Desktop: inject an IPC client for the player process.",
    )
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    session_connector: Option<Arc<dyn SessionConnector>>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
    audio_routing: Option<Arc<dyn AudioRouting>>,
    event_bus: Option<EventBus>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    /// Sets the session connector implementation (required).
    pub fn session_connector(mut self, connector: Arc<dyn SessionConnector>) -> Self {
        self.session_connector = Some(connector);
        self
    }

    /// Sets the lifecycle observer implementation (optional).
    ///
    /// The lifecycle observer reports visibility transitions of the host
    /// component so the controller can connect and disconnect with it.
    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Sets the audio routing implementation (optional).
    pub fn audio_routing(mut self, routing: Arc<dyn AudioRouting>) -> Self {
        self.audio_routing = Some(routing);
        self
    }

    /// Sets the event bus that receives session lifecycle events (optional).
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Enables or disables lifecycle binding.
    ///
    /// Requires a `LifecycleObserver` to be provided.
    ///
    /// Default: false
    pub fn bind_lifecycle(mut self, enabled: bool) -> Self {
        self.features.bind_lifecycle = enabled;
        self
    }

    /// Enables or disables volume routing on resume.
    ///
    /// Requires an `AudioRouting` to be provided.
    ///
    /// Default: false
    pub fn route_volume_on_resume(mut self, enabled: bool) -> Self {
        self.features.route_volume_on_resume = enabled;
        self
    }

    /// Sets all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if the session connector is missing or a feature flag
    /// is enabled without its bridge.
    pub fn build(self) -> Result<CoreConfig> {
        let session_connector = self
            .session_connector
            .ok_or_else(session_connector_missing_error)?;

        let config = CoreConfig {
            session_connector,
            lifecycle_observer: self.lifecycle_observer,
            audio_routing: self.audio_routing,
            event_bus: self.event_bus,
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}
