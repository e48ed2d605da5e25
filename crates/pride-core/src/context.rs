//! Detached background task registration.

use futures::future::BoxFuture;

/// Registration point for work that must outlive the response path.
///
/// The runtime guarantees a registered task runs to completion after the
/// response has been returned; the caller never awaits it and receives no
/// signal of its outcome. Used for background revalidation and
/// fire-and-forget cache writes.
pub trait ExecutionContext: Send + Sync {
    /// Register a task for completion outside the response path.
    fn wait_until(&self, task: BoxFuture<'static, ()>);
}
