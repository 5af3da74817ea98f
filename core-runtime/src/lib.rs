//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the session bridge:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the session core depends
//! on. It establishes the logging conventions, the bridge wiring performed at
//! startup, and the broadcast channel used to surface connection and progress
//! lifecycle events.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
