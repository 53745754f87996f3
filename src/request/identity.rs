//! Per-request correlation token.

use rand::Rng;

use crate::config::{REQUEST_ID_PREFIX, REQUEST_ID_SUFFIX_LEN};

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Correlation token sent as the `User-Agent` of every fire.
///
/// Format: `HTTPTEST/<unix seconds>.<4 chars [A-Z0-9]>`, which makes a single
/// request easy to find in downstream access logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a new token from the current time and a random suffix.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..REQUEST_ID_SUFFIX_LEN)
            .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
            .collect();
        let ts = chrono::Utc::now().timestamp();
        Self(format!("{REQUEST_ID_PREFIX}/{ts}.{suffix}"))
    }

    /// Derives a related token: same value plus `-suffix`.
    ///
    /// Used for the second fire of a comparison so both requests can be
    /// paired in logs yet told apart.
    pub fn child(&self, suffix: &str) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }

    /// The token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The request header carrying the token.
    pub fn header(&self) -> String {
        format!("User-Agent: {}", self.0)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let id = RequestId::generate();
        let rest = id
            .as_str()
            .strip_prefix("HTTPTEST/")
            .expect("prefix present");
        let (ts, suffix) = rest.split_once('.').expect("dot separator");
        assert!(ts.parse::<i64>().expect("numeric timestamp") > 1_600_000_000);
        assert_eq!(suffix.len(), 4);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_child_is_related_but_distinct() {
        let id = RequestId::generate();
        let child = id.child("B");
        assert_ne!(child, id);
        assert!(child.as_str().starts_with(id.as_str()));
        assert!(child.as_str().ends_with("-B"));
    }

    #[test]
    fn test_header_line() {
        let id = RequestId::generate();
        assert_eq!(id.header(), format!("User-Agent: {id}"));
    }
}
