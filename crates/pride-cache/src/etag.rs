//! Content fingerprinting for conditional requests.

use sha2::{Digest, Sha256};

/// Generate a quoted, content-addressed entity tag.
///
/// Deterministic: identical bytes always yield identical tags.
pub fn generate_etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    format!("\"{}\"", hex::encode(digest))
}

/// Strip a weak-validator prefix so strong and weak forms compare equal.
pub fn normalize_etag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_bytes_identical_tags() {
        assert_eq!(generate_etag(b"{\"a\":1}"), generate_etag(b"{\"a\":1}"));
    }

    #[test]
    fn test_different_bytes_different_tags() {
        assert_ne!(generate_etag(b"{\"a\":1}"), generate_etag(b"{\"a\":2}"));
    }

    #[test]
    fn test_tag_is_quoted_hex() {
        let tag = generate_etag(b"body");
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert!(tag[1..tag.len() - 1].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_normalize_strips_weak_prefix() {
        assert_eq!(normalize_etag("W/\"abc\""), "\"abc\"");
        assert_eq!(normalize_etag("\"abc\""), "\"abc\"");
    }
}
