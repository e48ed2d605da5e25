//! Request pipeline for the pride data edge service.
//!
//! This crate wires the pieces together:
//! - `App` - Per-request pipeline (timing, routing, cache, branding)
//! - `Router` - Exact-path route table with a 404 fallback
//! - `TokioSpawner` - Tracked detached-task execution context

mod app;
mod router;
mod tasks;

pub use app::*;
pub use router::*;
pub use tasks::*;
