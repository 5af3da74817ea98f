//! Workspace placeholder crate.
//!
//! This crate re-exports the session bridge so host applications can depend
//! on `session-bridge-workspace` alone instead of wiring `core-session`,
//! `core-runtime` and `bridge-traits` individually.

pub use bridge_traits as bridge;
pub use core_runtime as runtime;
pub use core_session::*;
