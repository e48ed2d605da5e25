//! Caching layer for the pride data edge service.
//!
//! This crate provides:
//! - `CacheKey` - Deployment-scoped canonical lookup keys
//! - `CachedEntry` - Stored response snapshots
//! - `FreshnessPolicy` - Soft-TTL staleness evaluation
//! - `CacheStore` - Key/value byte-store contract (+ `MemoryStore`)
//! - `SwrCache` - The stale-while-revalidate orchestrator
//! - Response decoration and content fingerprinting helpers

mod decorate;
mod entry;
mod etag;
mod freshness;
mod key;
mod store;
mod swr;

pub use decorate::*;
pub use entry::*;
pub use etag::*;
pub use freshness::*;
pub use key::*;
pub use store::*;
pub use swr::*;
