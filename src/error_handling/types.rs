//! Error type definitions.
//!
//! This module defines all error and failure types used throughout the engine.

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS client configuration.
    #[error("TLS configuration error: {0}")]
    TlsConfigError(#[from] rustls::Error),
}

/// Categories of transport failures.
///
/// Derived from the underlying client error so reports can say *what* broke
/// (DNS/connect, TLS, timeout...) without exposing library types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client or request could not be built
    Builder,
    /// DNS resolution or TCP connection failed
    Connect,
    /// TLS handshake or certificate verification failed
    Tls,
    /// The operation did not complete in time
    Timeout,
    /// Reading the response body failed
    Body,
    /// Protocol violation (bad handshake, malformed frame...)
    Protocol,
    /// Anything else
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    /// Human readable name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Builder => "request builder error",
            ErrorKind::Connect => "connection error",
            ErrorKind::Tls => "TLS error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Body => "response body error",
            ErrorKind::Protocol => "protocol error",
            ErrorKind::Other => "request error",
        }
    }
}

/// A fire that did not produce a response.
///
/// Never converted into a fabricated result: the caller always sees which
/// request failed and why.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request description itself is unusable (URL, method, header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client configuration (TLS) could not be built.
    #[error("Client setup failed: {0}")]
    Setup(String),

    /// The connect-to override could not be parsed or resolved.
    #[error("Invalid connect-to target '{target}': {reason}")]
    ConnectTo {
        /// Raw override as given
        target: String,
        /// What was wrong with it
        reason: String,
    },

    /// HTTP(S) fire failed.
    #[error("HTTP {kind} for {url}: {source}")]
    Http {
        /// Target URL
        url: String,
        /// Failure category
        kind: ErrorKind,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// WebSocket fire failed.
    #[error("WebSocket {kind} for {url}: {source}")]
    WebSocket {
        /// Target URL
        url: String,
        /// Failure category
        kind: ErrorKind,
        /// Underlying client error
        #[source]
        source: tungstenite::Error,
    },

    /// A bounded step did not finish in time.
    #[error("{step} for {url} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        /// Target URL
        url: String,
        /// What was being waited for
        step: &'static str,
        /// Bound that expired
        after: Duration,
    },

    /// The WebSocket closed without sending a data message.
    #[error("WebSocket {url} closed before replying")]
    NoReply {
        /// Target URL
        url: String,
    },
}

impl TransportError {
    /// Category of the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::InvalidRequest(_)
            | TransportError::Setup(_)
            | TransportError::ConnectTo { .. } => ErrorKind::Builder,
            TransportError::Http { kind, .. } | TransportError::WebSocket { kind, .. } => *kind,
            TransportError::Timeout { .. } => ErrorKind::Timeout,
            TransportError::NoReply { .. } => ErrorKind::Protocol,
        }
    }
}

/// Response body announced itself as compressed but could not be inflated.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Gzip magic number present, stream corrupt or truncated.
    #[error("Corrupt gzip stream: {0}")]
    CorruptGzip(#[source] std::io::Error),
}

/// First requirement of a set that a response did not satisfy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertionFailure {
    /// Status code differs.
    #[error("Expected status code {expected}, got {observed}")]
    Status {
        /// Expected status
        expected: u16,
        /// Observed status
        observed: u16,
    },

    /// Header missing or not containing the expected substring.
    #[error("Expected header '{name}' to contain '{expected}', got '{observed}'")]
    Header {
        /// Header name as written in the expectation
        name: String,
        /// Expected substring (after template substitution)
        expected: String,
        /// Observed value, empty when the header is absent
        observed: String,
    },

    /// Response was not faster than the ceiling.
    #[error("Expected response in less than {ceiling} ({ceiling_secs}s), took {elapsed:.3}s")]
    Timing {
        /// Ceiling as written in the expectation
        ceiling: String,
        /// Ceiling in seconds
        ceiling_secs: f64,
        /// Observed elapsed seconds
        elapsed: f64,
    },

    /// Decoded body lacks an expected substring.
    #[error("Expected body to contain '{expected}', body was '{preview}'")]
    Body {
        /// Expected substring (after template substitution)
        expected: String,
        /// Start of the decoded body, lossily decoded
        preview: String,
    },
}

/// Reason a test case did not pass.
#[derive(Error, Debug)]
pub enum Failure {
    /// The response did not satisfy the requirement set.
    #[error("{0}")]
    Assertion(#[from] AssertionFailure),

    /// No response at all.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The fire through the connect-to override failed.
    #[error("Via connect-to {connect_to}: {failure}")]
    ConnectTo {
        /// Override used for the failing fire
        connect_to: String,
        /// What failed
        failure: Box<Failure>,
    },

    /// Both fires of a comparison failed, independently.
    #[error("{primary}; {secondary}")]
    Both {
        /// Failure of the untouched fire
        primary: Box<Failure>,
        /// Failure of the connect-to fire
        secondary: Box<Failure>,
    },

    /// Both fires passed but returned different bodies.
    #[error("Response body differs via connect-to {connect_to}: sha256 {primary} != {secondary}")]
    DigestMismatch {
        /// Override used for the second fire
        connect_to: String,
        /// Hex SHA-256 of the untouched fire's decoded body
        primary: String,
        /// Hex SHA-256 of the connect-to fire's decoded body
        secondary: String,
    },
}
