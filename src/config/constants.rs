//! Configuration constants.
//!
//! Timeouts, defaults and literal tokens shared by the transports, the matcher
//! and the spec-file loader.

use std::time::Duration;

// Network operation timeouts
/// WebSocket connect and reply timeout.
///
/// Applied separately to the upgrade handshake and to waiting for the reply.
pub const WS_TIMEOUT: Duration = Duration::from_secs(3);
/// Default overall timeout for one HTTP(S) fire, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Bound on resolving a connect-to hostname.
pub const DNS_TIMEOUT: Duration = Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS);

// Request identity
/// Prefix of every generated request identity (`HTTPTEST/<ts>.<rand>`).
pub const REQUEST_ID_PREFIX: &str = "HTTPTEST";
/// Length of the random suffix of a request identity.
pub const REQUEST_ID_SUFFIX_LEN: usize = 4;
/// Suffix appended to the identity of the connect-to fire of a comparison.
pub const COMPARE_ID_SUFFIX: &str = "B";

// Template substitution
/// Literal token replaced by the configured test domain.
pub const DOMAIN_PLACEHOLDER: &str = "{{domain}}";
/// Environment variable holding the test domain.
pub const DOMAIN_ENV_VAR: &str = "HTTP_TEST_DOMAIN";
/// Test domain used when `HTTP_TEST_DOMAIN` is not set.
pub const DEFAULT_DOMAIN: &str = "example.com";

/// Message sent over a WebSocket when the request has no payload.
pub const DEFAULT_WS_MESSAGE: &str = "Hello";

/// Default HTTP method when a spec does not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// Only this expected status triggers the digest comparison of two backends.
pub const HTTP_STATUS_OK: u16 = 200;

/// Maximum number of body bytes quoted in a failure message.
pub const MAX_BODY_PREVIEW_BYTES: usize = 200;
