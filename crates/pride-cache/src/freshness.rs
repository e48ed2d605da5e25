//! Soft-TTL staleness evaluation.

use chrono::{DateTime, Utc};

use crate::entry::CachedEntry;

/// Decides whether a cached entry still counts as fresh.
///
/// The threshold is the "soft" TTL: entries older than it are still
/// servable but must trigger a background refresh.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    threshold_secs: u64,
}

impl FreshnessPolicy {
    /// Create a policy with the given threshold in seconds.
    pub fn new(threshold_secs: u64) -> Self {
        Self { threshold_secs }
    }

    /// Check whether `entry` is stale at `now`.
    ///
    /// An entry without a parsable `Date` header is treated as stale,
    /// failing safe toward refresh.
    pub fn is_stale(&self, entry: &CachedEntry, now: DateTime<Utc>) -> bool {
        match entry.age_seconds(now) {
            Some(age) => age > self.threshold_secs as i64,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry_aged(seconds: i64) -> CachedEntry {
        let date = Utc::now() - chrono::Duration::seconds(seconds);
        let mut headers = BTreeMap::new();
        headers.insert("date".to_string(), date.to_rfc2822());
        CachedEntry {
            body: Vec::new(),
            headers,
        }
    }

    #[test]
    fn test_within_threshold_is_fresh() {
        let policy = FreshnessPolicy::new(300);
        assert!(!policy.is_stale(&entry_aged(10), Utc::now()));
    }

    #[test]
    fn test_beyond_threshold_is_stale() {
        let policy = FreshnessPolicy::new(5);
        assert!(policy.is_stale(&entry_aged(10), Utc::now()));
    }

    #[test]
    fn test_missing_date_is_stale() {
        let entry = CachedEntry {
            body: Vec::new(),
            headers: BTreeMap::new(),
        };
        assert!(FreshnessPolicy::new(300).is_stale(&entry, Utc::now()));
    }

    #[test]
    fn test_unparsable_date_is_stale() {
        let mut headers = BTreeMap::new();
        headers.insert("date".to_string(), "not a date".to_string());
        let entry = CachedEntry {
            body: Vec::new(),
            headers,
        };
        assert!(FreshnessPolicy::new(300).is_stale(&entry, Utc::now()));
    }
}
