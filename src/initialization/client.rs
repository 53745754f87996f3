//! HTTP client and TLS configuration.
//!
//! Both transports verify certificates against the webpki root bundle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;
use rustls::{ClientConfig, RootCertStore};

use crate::config::TCP_CONNECT_TIMEOUT_SECS;
use crate::error_handling::InitializationError;

/// HTTP protocol version used for a fire.
///
/// Always explicit, never negotiated, so a test result does not depend on
/// what the server happens to advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    /// HTTP/1.1 only
    Http11,
    /// HTTP/2 only (prior knowledge on cleartext, `h2` ALPN on TLS)
    Http2,
}

/// Builds the HTTP client for one fire.
///
/// Creates a `reqwest::Client` configured with:
/// - Overall timeout `timeout` and connect timeout `TCP_CONNECT_TIMEOUT_SECS`
/// - No redirect following (the first response is the one under test)
/// - No automatic decompression (the decoder owns that)
/// - Rustls with the webpki root bundle
/// - A fixed protocol version
/// - An optional DNS override for the connect-to target
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn build_http_client(
    version: HttpVersion,
    timeout: Duration,
    resolve: Option<&(String, Vec<SocketAddr>)>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = ClientBuilder::new()
        .use_rustls_tls()
        .tls_built_in_root_certs(true)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none());

    builder = match version {
        HttpVersion::Http11 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
    };

    if let Some((domain, addrs)) = resolve {
        builder = builder.resolve_to_addrs(domain, addrs);
    }

    builder.build()
}

/// Builds the rustls configuration used for `wss://` connections.
///
/// TLS 1.2 and 1.3, webpki roots, no client authentication.
///
/// # Errors
///
/// Returns `InitializationError::TlsConfigError` if the protocol versions are
/// not supported by the crypto provider.
pub fn websocket_tls_config() -> Result<Arc<ClientConfig>, InitializationError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_protocol_versions(&[&rustls::version::TLS12, &rustls::version::TLS13])?
            .with_root_certificates(root_store)
            .with_no_client_auth();

    Ok(Arc::new(config))
}
