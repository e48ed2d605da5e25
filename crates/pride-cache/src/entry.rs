//! Stored response snapshots.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, DATE, ETAG};
use serde::{Deserialize, Serialize};

use pride_core::Response;

/// A cached response: body bytes plus the headers worth keeping.
///
/// Written by the orchestrator after a successful origin call and read on
/// every lookup. The stored `Date` header marks entry creation and drives
/// staleness; `ETag` drives conditional matching. Entries are never
/// explicitly deleted here — eviction belongs to the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Response body.
    pub body: Vec<u8>,
    /// Stored headers.
    pub headers: BTreeMap<String, String>,
}

impl CachedEntry {
    /// Snapshot a response for storage, stamping `Date` with `now` when
    /// the response carries none.
    pub fn from_response(response: &Response, now: DateTime<Utc>) -> Self {
        let mut headers = BTreeMap::new();
        for name in [CONTENT_TYPE, ETAG, DATE] {
            if let Some(value) = response.headers().get(&name).and_then(|v| v.to_str().ok()) {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        headers
            .entry(DATE.as_str().to_string())
            .or_insert_with(|| now.to_rfc2822());

        Self {
            body: response.body().to_vec(),
            headers,
        }
    }

    /// Stored header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The stored content fingerprint.
    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }

    /// Entry creation time from the stored `Date` header.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.header("date")
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|d| d.with_timezone(&Utc))
    }

    /// Whole seconds elapsed since entry creation, if `Date` parses.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.date().map(|date| (now - date).num_seconds())
    }

    /// Rebuild the stored response (status `200`).
    ///
    /// Headers that no longer parse are dropped rather than failing the
    /// whole entry.
    pub fn to_response(&self) -> Response {
        let mut response = http::Response::new(Bytes::copy_from_slice(&self.body));
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}
