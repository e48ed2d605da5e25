//! Deployment-scoped cache key derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

// Every key is rebased onto a fixed internal origin so the externally
// visible hostname, scheme, and port never influence cache identity.
const INTERNAL_ORIGIN: &str = "https://cache.internal";

// Query parameter carrying the deployment version id.
const VERSION_PARAM: &str = "vid";

/// Canonical identifier under which a response is stored and looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for an inbound request.
    ///
    /// The request's path and query are preserved verbatim while the
    /// deployment version id is set as a query parameter, so local,
    /// staging, and production share cache semantics and deploying new
    /// code invalidates every entry written by previous deployments.
    pub fn for_request(path_and_query: &str, version_id: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        let mut pairs: Vec<(String, String)> = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        pairs.retain(|(name, _)| name != VERSION_PARAM);
        pairs.push((VERSION_PARAM.to_string(), version_id.to_string()));

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let query = serializer.finish();

        Self(format!("{INTERNAL_ORIGIN}{path}?{query}"))
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
