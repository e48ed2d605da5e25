//! Exact-path route matching.

/// Targets the app can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// The cached festival data payload.
    PrideData,
}

/// Exact-path route table.
///
/// Lookup is by path only; anything else about the request (host, query,
/// method) does not participate. Unmatched paths get a plain `404`.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<(String, RouteTarget)>,
}

impl Router {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    pub fn route(mut self, path: impl Into<String>, target: RouteTarget) -> Self {
        self.routes.push((path.into(), target));
        self
    }

    /// Find the target for a request path.
    pub fn find(&self, path: &str) -> Option<RouteTarget> {
        self.routes
            .iter()
            .find(|(candidate, _)| candidate == path)
            .map(|(_, target)| *target)
    }
}
