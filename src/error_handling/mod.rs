//! Error handling.
//!
//! This module provides:
//! - Error type definitions (initialization, transport, decode)
//! - Assertion and comparison failures that make up a failing verdict
//! - Categorization of client library errors into [`ErrorKind`]
//!
//! Errors are categorized into:
//! - **Transport errors**: no response was obtained; fatal to that fire
//! - **Decode errors**: recovered locally, never reported as a test failure
//! - **Assertion failures**: response did not meet a requirement
//! - **Digest mismatch**: two backends disagreed on the body

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, categorize_websocket_error};
pub use types::{
    AssertionFailure, DecodeError, ErrorKind, Failure, InitializationError, TransportError,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_message_cites_both_values() {
        let failure = AssertionFailure::Status {
            expected: 200,
            observed: 201,
        };
        let message = failure.to_string();
        assert!(message.contains("200"));
        assert!(message.contains("201"));
    }

    #[test]
    fn test_header_failure_message_shows_empty_observed() {
        let failure = AssertionFailure::Header {
            name: "x-custom".to_string(),
            expected: "foo".to_string(),
            observed: String::new(),
        };
        assert_eq!(
            failure.to_string(),
            "Expected header 'x-custom' to contain 'foo', got ''"
        );
    }

    #[test]
    fn test_transport_error_kind() {
        let error = TransportError::Timeout {
            url: "ws://localhost/".to_string(),
            step: "WebSocket reply",
            after: std::time::Duration::from_secs(3),
        };
        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert_eq!(
            error.to_string(),
            "WebSocket reply for ws://localhost/ timed out after 3s"
        );
        assert_eq!(
            TransportError::InvalidRequest("x".into()).kind(),
            ErrorKind::Builder
        );
    }

    #[test]
    fn test_failure_wraps_transport_error() {
        let failure: Failure = TransportError::NoReply {
            url: "ws://a/".to_string(),
        }
        .into();
        assert!(failure.to_string().starts_with("Transport error:"));
    }

    #[test]
    fn test_both_failure_reports_each_side() {
        let failure = Failure::Both {
            primary: Box::new(Failure::Assertion(AssertionFailure::Status {
                expected: 200,
                observed: 500,
            })),
            secondary: Box::new(Failure::ConnectTo {
                connect_to: "10.0.0.1".to_string(),
                failure: Box::new(Failure::Assertion(AssertionFailure::Status {
                    expected: 200,
                    observed: 502,
                })),
            }),
        };
        let message = failure.to_string();
        assert!(message.contains("got 500"));
        assert!(message.contains("Via connect-to 10.0.0.1"));
        assert!(message.contains("got 502"));
    }
}
