//! Outbound response branding and cache-policy headers.

use std::fmt;

use chrono::{DateTime, Utc};
use http::header::{HeaderName, HeaderValue, CACHE_CONTROL, DATE, VARY};
use http::StatusCode;

use pride_core::{Config, Response};

/// Brand header value carried by every response this layer produces.
const X_PRIDE: &str = "Made with PRIDE by Keen";

// Statuses whose responses may be cached by a shared cache.
const CACHEABLE: [StatusCode; 2] = [StatusCode::OK, StatusCode::NOT_MODIFIED];

/// Header names added by the decorator.
pub mod header_names {
    /// Cache outcome header (`HIT` or `MISS`).
    pub const X_CACHE: &str = "x-cache";
    /// Brand header.
    pub const X_PRIDE: &str = "x-pride";
    /// Human-readable entry age, set on hits.
    pub const X_PRIDE_DATA_AGE: &str = "x-pride-data-age";
    /// Deployment version id.
    pub const X_PRIDE_VERSION_ID: &str = "x-pride-version-id";
    /// Deployment version tag.
    pub const X_PRIDE_VERSION_TAG: &str = "x-pride-version-tag";
    /// Deployment version timestamp.
    pub const X_PRIDE_VERSION_TIMESTAMP: &str = "x-pride-version-timestamp";
}

/// Whether the response body came from the cache store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the store (fresh or stale).
    Hit,
    /// Produced by the origin handler.
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Apply branding, versioning, and cache-policy headers to a response.
///
/// This is the single point where cache-control policy is decided, and it
/// must run exactly once per outbound response. Idempotent per response:
/// headers are overwritten, except `Cache-Control` which is only set when
/// absent. Cacheable statuses get the shared-cache SWR directive; every
/// other status gets a strict no-store directive so failures are never
/// cached anywhere.
pub fn decorate(response: &mut Response, status: CacheStatus, config: &Config, now: DateTime<Utc>) {
    set(response, VARY.as_str(), "Origin");
    set(response, header_names::X_CACHE, &status.to_string());
    set(response, header_names::X_PRIDE, X_PRIDE);

    if !response.headers().contains_key(CACHE_CONTROL) {
        let directive = if CACHEABLE.contains(&response.status()) {
            format!(
                "public, s-maxage={}, stale-while-revalidate={}",
                config.s_maxage, config.swr_ttl
            )
        } else {
            "no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0".to_string()
        };
        set(response, CACHE_CONTROL.as_str(), &directive);
    }

    if status == CacheStatus::Hit {
        let date = response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok());
        if let Some(date) = date {
            let age = (now - date.with_timezone(&Utc)).num_seconds();
            set(response, header_names::X_PRIDE_DATA_AGE, &format_age(age));
        }
    }

    set(response, header_names::X_PRIDE_VERSION_ID, &config.version.id);
    set(response, header_names::X_PRIDE_VERSION_TAG, &config.version.tag);
    set(
        response,
        header_names::X_PRIDE_VERSION_TIMESTAMP,
        &config.version.timestamp,
    );
}

fn set(response: &mut Response, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (
        HeaderName::try_from(name),
        HeaderValue::try_from(value),
    ) {
        response.headers_mut().insert(name, value);
    }
}

/// Render an age in seconds as `"1m 30s"`, `"45s"`, or `"0s"`.
///
/// Minutes are omitted when zero; seconds are always present; non-positive
/// input collapses to `"0s"`.
pub fn format_age(seconds: i64) -> String {
    if seconds <= 0 {
        return "0s".to_string();
    }
    let m = seconds / 60;
    let s = seconds % 60;
    if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
