//! Observability for the pride data edge service.
//!
//! This crate provides:
//! - `Logger` - Leveled, environment-aware structured logging
//! - `server_timing` - Serialization of per-request measurements
//!
//! The `TimingRecorder` itself lives in `pride-core` so the origin-handler
//! contract can reference it; it is re-exported here for convenience.

mod logging;
pub mod server_timing;

pub use logging::*;

pub use pride_core::TimingRecorder;
