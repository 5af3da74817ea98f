//! # Track Identity Resolution
//!
//! Decides whether a transport command targets the track already loaded in
//! the playback session ("continue") or a different one ("replace"), and
//! dispatches the matching command sequence.
//!
//! The loaded track is read from the transport on every call, never cached,
//! so back-to-back commands always see the session's latest answer.
//!
//! ## Identity
//!
//! Two tracks are the same when their URIs are byte-for-byte equal. No
//! normalization is applied and no other metadata is consulted. If the
//! session can hold two distinct queue entries that share a URI (the same
//! file attached to two messages), a command for the second entry is
//! treated as targeting the first one.

use crate::error::Result;
use bridge_traits::{PlayFromUriExtras, SessionTransport};
use core_runtime::logging::redact_uri;
use tracing::debug;

/// How a command relates to the track currently loaded in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMode {
    /// The requested track is the loaded one.
    Continue,
    /// The requested track is not loaded (or nothing is).
    Replace,
}

/// Stateless dispatcher of transport commands keyed on track identity.
pub struct TrackIdentityResolver<'a> {
    transport: &'a dyn SessionTransport,
}

impl<'a> TrackIdentityResolver<'a> {
    pub fn new(transport: &'a dyn SessionTransport) -> Self {
        Self { transport }
    }

    /// Classify `uri` against the session's loaded track.
    pub async fn mode_for(&self, uri: &str) -> Result<CommandMode> {
        let loaded = self.transport.current_track().await?;
        Ok(match loaded {
            Some(track) if track.uri == uri => CommandMode::Continue,
            _ => CommandMode::Replace,
        })
    }

    /// Start (or restart) playback of `uri` at `start_position_ms`.
    ///
    /// Continue: seek, then play. Replace: a single load-and-play command
    /// carrying the message id and start position as extras.
    pub async fn start_playback(
        &self,
        uri: &str,
        message_id: i64,
        start_position_ms: u64,
    ) -> Result<CommandMode> {
        let mode = self.mode_for(uri).await?;
        debug!(uri = redact_uri(uri), ?mode, start_position_ms, "start playback");

        match mode {
            CommandMode::Continue => {
                self.transport.seek(start_position_ms).await?;
                self.transport.play().await?;
            }
            CommandMode::Replace => {
                let extras = PlayFromUriExtras {
                    message_id,
                    start_position_ms,
                };
                self.transport.play_from_uri(uri.to_string(), extras).await?;
            }
        }

        Ok(mode)
    }

    /// Pause `uri` if it is the loaded track.
    pub async fn pause_playback(&self, uri: &str) -> Result<CommandMode> {
        let mode = self.mode_for(uri).await?;
        if mode == CommandMode::Continue {
            self.transport.pause().await?;
        } else {
            debug!(uri = redact_uri(uri), "pause ignored, track not loaded");
        }
        Ok(mode)
    }

    /// Move the playhead of `uri` if it is the loaded track.
    ///
    /// Issues pause, seek, play in that order so the seek does not skip
    /// audibly.
    pub async fn seek_to_position(&self, uri: &str, position_ms: u64) -> Result<CommandMode> {
        let mode = self.mode_for(uri).await?;
        if mode == CommandMode::Continue {
            self.transport.pause().await?;
            self.transport.seek(position_ms).await?;
            self.transport.play().await?;
        } else {
            debug!(uri = redact_uri(uri), position_ms, "seek ignored, track not loaded");
        }
        Ok(mode)
    }

    /// Stop the session if `uri` is the loaded track.
    pub async fn stop_playback_and_reset(&self, uri: &str) -> Result<CommandMode> {
        let mode = self.mode_for(uri).await?;
        if mode == CommandMode::Continue {
            self.transport.stop().await?;
        } else {
            debug!(uri = redact_uri(uri), "stop ignored, track not loaded");
        }
        Ok(mode)
    }
}
