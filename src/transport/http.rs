//! HTTP(S) executor.
//!
//! One fire is one request on a freshly built `reqwest::Client`: the protocol
//! version and the connect-to override are client-level settings, and a
//! per-fire client keeps fires from sharing connections.

use std::time::Instant;

use log::{debug, info};
use reqwest::header::{HeaderName, HeaderValue as WireHeaderValue, HOST};
use reqwest::Method;
use url::Url;

use crate::config::Config;
use crate::error_handling::{categorize_reqwest_error, TransportError};
use crate::initialization::{build_http_client, HttpVersion};
use crate::request::{FiredResult, RequestSpec};

use super::headers::{split_header, HeaderCollector};

/// Converts raw `"Name: value"` lines into a header map, preserving order and
/// repeats.
fn header_map(lines: &[String]) -> Result<reqwest::header::HeaderMap, TransportError> {
    let mut map = reqwest::header::HeaderMap::with_capacity(lines.len());
    for line in lines {
        let (name, value) = split_header(line)
            .ok_or_else(|| TransportError::InvalidRequest(format!("malformed header '{line}'")))?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("header name in '{line}': {e}")))?;
        let value = WireHeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header value in '{line}': {e}")))?;
        map.append(name, value);
    }
    Ok(map)
}

/// Fires `spec` over HTTP(S) and returns the raw result.
///
/// The body is returned exactly as received (automatic decompression is
/// disabled); `body_decoded` is left equal to it for the orchestrator to fill.
///
/// # Errors
///
/// Returns a `TransportError` for an unusable spec (URL, method, header,
/// connect-to) and for any failure to obtain a complete response (DNS,
/// connect, TLS, timeout, body read).
pub async fn fire_http(spec: &RequestSpec, config: &Config) -> Result<FiredResult, TransportError> {
    let url = Url::parse(spec.url())
        .map_err(|e| TransportError::InvalidRequest(format!("URL '{}': {e}", spec.url())))?;
    let method = Method::from_bytes(spec.method().as_bytes())
        .map_err(|_| TransportError::InvalidRequest(format!("method '{}'", spec.method())))?;

    let outgoing = spec.outgoing_headers();
    let mut headers = header_map(&outgoing)?;

    let plan = match spec.connect_to() {
        Some(connect_to) => Some(connect_to.plan(&url).await?),
        None => None,
    };
    let request_url = match &plan {
        Some(plan) => {
            if let Some(host) = &plan.host_header {
                if !headers.contains_key(HOST) {
                    let value = WireHeaderValue::from_str(host).map_err(|e| {
                        TransportError::InvalidRequest(format!("Host '{host}': {e}"))
                    })?;
                    headers.insert(HOST, value);
                }
            }
            plan.request_url.clone()
        }
        None => url.clone(),
    };

    let version = if spec.http2() {
        HttpVersion::Http2
    } else {
        HttpVersion::Http11
    };
    let resolve = plan.as_ref().and_then(|plan| plan.resolve.as_ref());
    let client = build_http_client(version, config.http_timeout, resolve).map_err(|source| {
        TransportError::Http {
            url: spec.url().to_string(),
            kind: categorize_reqwest_error(&source),
            source,
        }
    })?;

    let mut request = client.request(method, request_url).headers(headers);
    if let Some(payload) = spec.payload() {
        request = request.body(payload.to_vec());
    }

    if spec.verbose() {
        info!(
            "> {} {} [{}] via {}",
            spec.method(),
            spec.url(),
            spec.request_id(),
            spec.connect_to().map_or("DNS", |c| c.as_str())
        );
        for line in &outgoing {
            info!("> {line}");
        }
    }
    debug!("Firing HTTP {} {} ({})", spec.method(), spec.url(), spec.request_id());

    let to_error = |source: reqwest::Error| TransportError::Http {
        url: spec.url().to_string(),
        kind: categorize_reqwest_error(&source),
        source,
    };

    let started = Instant::now();
    let response = request.send().await.map_err(to_error)?;

    // Headers arrive before the body; capture them into a collector that
    // lives for this fire only
    let status = response.status().as_u16();
    let mut collector = HeaderCollector::new();
    collector.record_map(response.headers());
    let version = response.version();

    let body = response.bytes().await.map_err(to_error)?.to_vec();
    let elapsed = started.elapsed().as_secs_f64();

    let response_headers = collector.finish();
    if spec.verbose() {
        info!("< {version:?} {status} ({elapsed:.3}s, {} bytes)", body.len());
        for (name, value) in response_headers.iter() {
            for v in value.values() {
                info!("< {name}: {v}");
            }
        }
    }
    debug!(
        "HTTP {} {} -> {} in {:.3}s ({})",
        spec.method(),
        spec.url(),
        status,
        elapsed,
        spec.request_id()
    );

    Ok(FiredResult {
        status,
        headers: response_headers,
        body_decoded: body.clone(),
        body,
        elapsed,
        request_id: spec.request_id().clone(),
        connect_to: spec.connect_to().map(|c| c.as_str().to_string()),
        request_headers: outgoing,
    })
}
