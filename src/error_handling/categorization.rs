//! Error categorization.
//!
//! Maps client library errors onto [`ErrorKind`] so every transport failure
//! carries a category independent of the library that produced it.

use std::error::Error as StdError;

use tokio_tungstenite::tungstenite;

use super::types::ErrorKind;

/// Returns true if a rustls error appears anywhere in the source chain.
///
/// rustls errors usually arrive wrapped in an `io::Error`, so both the chain
/// itself and the inner error of every `io::Error` are inspected.
fn has_tls_cause(error: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(cause) = current {
        if cause.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io
                .get_ref()
                .is_some_and(|inner| inner.downcast_ref::<rustls::Error>().is_some())
            {
                return true;
            }
        }
        current = cause.source();
    }
    false
}

/// Categorizes a `reqwest::Error` into an `ErrorKind`.
///
/// TLS failures are reported by reqwest as connect errors, so the source chain
/// is checked for a rustls error first.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorKind {
    if has_tls_cause(error) {
        ErrorKind::Tls
    } else if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_builder() {
        ErrorKind::Builder
    } else if error.is_connect() {
        ErrorKind::Connect
    } else if error.is_body() || error.is_decode() {
        ErrorKind::Body
    } else {
        ErrorKind::Other
    }
}

/// Categorizes a `tungstenite::Error` into an `ErrorKind`.
pub fn categorize_websocket_error(error: &tungstenite::Error) -> ErrorKind {
    match error {
        tungstenite::Error::Tls(_) => ErrorKind::Tls,
        tungstenite::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            ErrorKind::Timeout
        }
        tungstenite::Error::Io(io) if has_tls_cause(io) => ErrorKind::Tls,
        tungstenite::Error::Io(_) => ErrorKind::Connect,
        tungstenite::Error::Url(_) | tungstenite::Error::HttpFormat(_) => ErrorKind::Builder,
        tungstenite::Error::Protocol(_)
        | tungstenite::Error::Http(_)
        | tungstenite::Error::Capacity(_) => ErrorKind::Protocol,
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_io_errors_are_connect_errors() {
        let error = tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(categorize_websocket_error(&error), ErrorKind::Connect);
    }

    #[test]
    fn test_websocket_io_timeout_is_timeout() {
        let error = tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "slow",
        ));
        assert_eq!(categorize_websocket_error(&error), ErrorKind::Timeout);
    }

    #[test]
    fn test_websocket_wrapped_rustls_error_is_tls() {
        let error = tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(rustls::CertificateError::UnknownIssuer),
        ));
        assert_eq!(categorize_websocket_error(&error), ErrorKind::Tls);
    }

    #[test]
    fn test_websocket_protocol_error() {
        let error = tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::HandshakeIncomplete,
        );
        assert_eq!(categorize_websocket_error(&error), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_reqwest_connection_refused_is_connect() {
        // Port 9 (discard) on localhost is almost never listening
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .expect("client");
        let error = client
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("nothing listens on port 9");
        let kind = categorize_reqwest_error(&error);
        assert!(
            kind == ErrorKind::Connect || kind == ErrorKind::Timeout,
            "unexpected kind {kind:?}"
        );
    }
}
