//! Core abstractions for the pride data edge service.
//!
//! This crate provides the fundamental types and traits:
//! - `Config` - Validated, immutable deployment configuration
//! - `OriginHandler` - Contract between the cache layer and the origin
//! - `ExecutionContext` - Detached background task registration
//! - `TimingRecorder` - Per-request timing accumulation

mod config;
mod context;
mod handler;
mod timing;

pub use config::*;
pub use context::*;
pub use handler::*;
pub use timing::*;
