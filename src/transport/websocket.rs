//! WebSocket executor: connect, send one message, read one reply, close.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Instant;

use futures::{SinkExt, StreamExt};
use log::{debug, error, info};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{client_async_tls_with_config, Connector};
use url::{Host, Url};

use crate::config::{Config, DEFAULT_WS_MESSAGE, WS_TIMEOUT};
use crate::error_handling::{categorize_websocket_error, TransportError};
use crate::initialization::websocket_tls_config;
use crate::request::{FiredResult, RequestSpec};

use super::headers::{split_header, HeaderCollector};

/// Pulls the `Origin` header out of a header list.
///
/// The name is matched case-insensitively; the value keeps its case. Every
/// other header is returned untouched and in its original order. When several
/// `Origin` headers are present the last one wins and all are removed.
///
/// The origin is then set explicitly on the upgrade request instead of being
/// forwarded as an ordinary header, so exactly one `Origin` reaches servers
/// that check it.
pub fn select_origin_header(headers: &[String]) -> (Option<String>, Vec<String>) {
    let mut origin = None;
    let mut rest = Vec::with_capacity(headers.len());

    for header in headers {
        match split_header(header) {
            Some((name, value)) if name.eq_ignore_ascii_case("origin") => {
                origin = Some(value.to_string());
            }
            _ => rest.push(header.clone()),
        }
    }
    (origin, rest)
}

fn ws_error(url: &str, source: tungstenite::Error) -> TransportError {
    TransportError::WebSocket {
        url: url.to_string(),
        kind: categorize_websocket_error(&source),
        source,
    }
}

/// Builds the upgrade request for `url` carrying `headers` and `origin`.
fn upgrade_request(
    url: &str,
    headers: &[String],
    origin: Option<&str>,
) -> Result<tungstenite::handshake::client::Request, TransportError> {
    let mut request = url.into_client_request().map_err(|e| ws_error(url, e))?;

    // Headers the handshake generates itself are replaced, not duplicated
    let generated: HashSet<HeaderName> = request.headers().keys().cloned().collect();
    let request_headers = request.headers_mut();

    for line in headers {
        let (name, value) = split_header(line)
            .ok_or_else(|| TransportError::InvalidRequest(format!("malformed header '{line}'")))?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("header name in '{line}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header value in '{line}': {e}")))?;
        if generated.contains(&name) {
            request_headers.insert(name, value);
        } else {
            request_headers.append(name, value);
        }
    }

    if let Some(origin) = origin {
        let value = HeaderValue::from_str(origin)
            .map_err(|e| TransportError::InvalidRequest(format!("Origin '{origin}': {e}")))?;
        request_headers.insert(ORIGIN, value);
    }

    Ok(request)
}

/// Addresses to open the TCP connection to.
async fn target_addrs(spec: &RequestSpec, url: &Url) -> Result<Vec<SocketAddr>, TransportError> {
    if let Some(connect_to) = spec.connect_to() {
        return Ok(connect_to.plan(url).await?.addrs);
    }

    let port = url
        .port_or_known_default()
        .ok_or_else(|| TransportError::InvalidRequest(format!("no port known for URL {url}")))?;

    match url.host() {
        Some(Host::Ipv4(ip)) => Ok(vec![SocketAddr::new(ip.into(), port)]),
        Some(Host::Ipv6(ip)) => Ok(vec![SocketAddr::new(ip.into(), port)]),
        Some(Host::Domain(domain)) => Ok(tokio::net::lookup_host((domain, port))
            .await
            .map_err(|e| ws_error(url.as_str(), tungstenite::Error::Io(e)))?
            .collect()),
        None => Err(TransportError::InvalidRequest(format!("URL has no host: {url}"))),
    }
}

/// Fires `spec` over a WebSocket.
///
/// Connect and reply are each bounded by [`WS_TIMEOUT`]. A handshake the
/// server refuses (any status other than 101) is not an error: the result
/// carries the server's status, headers and body so tests can assert on the
/// refusal.
///
/// # Errors
///
/// Returns a `TransportError` on connection, TLS or protocol failure, on
/// timeout, and when the server closes without replying.
pub async fn fire_websocket(
    spec: &RequestSpec,
    _config: &Config,
) -> Result<FiredResult, TransportError> {
    let url_str = spec.url();
    let url = Url::parse(url_str)
        .map_err(|e| TransportError::InvalidRequest(format!("URL '{url_str}': {e}")))?;

    let outgoing = spec.outgoing_headers();
    let (origin, forwarded) = select_origin_header(&outgoing);
    let request = upgrade_request(url_str, &forwarded, origin.as_deref())?;
    let addrs = timeout(WS_TIMEOUT, target_addrs(spec, &url))
        .await
        .map_err(|_| TransportError::Timeout {
            url: url_str.to_string(),
            step: "WebSocket address resolution",
            after: WS_TIMEOUT,
        })??;
    let tls = websocket_tls_config().map_err(|e| TransportError::Setup(e.to_string()))?;

    if spec.verbose() {
        info!("> WebSocket {url_str} [{}]", spec.request_id());
        for line in &forwarded {
            info!("> {line}");
        }
        if let Some(origin) = &origin {
            info!("> Origin: {origin}");
        }
    }
    debug!("Firing WebSocket {url_str} ({})", spec.request_id());

    let started = Instant::now();
    let handshake = async {
        let stream = TcpStream::connect(&addrs[..])
            .await
            .map_err(tungstenite::Error::Io)?;
        client_async_tls_with_config(request, stream, None, Some(Connector::Rustls(tls))).await
    };

    let (mut socket, response) = match timeout(WS_TIMEOUT, handshake).await {
        Err(_) => {
            return Err(TransportError::Timeout {
                url: url_str.to_string(),
                step: "WebSocket handshake",
                after: WS_TIMEOUT,
            })
        }
        Ok(Err(tungstenite::Error::Http(refused))) => {
            let mut collector = HeaderCollector::new();
            collector.record_map(refused.headers());
            let body = refused.body().clone().unwrap_or_default();
            let status = refused.status().as_u16();
            error!(
                "WebSocket handshake to {url_str} refused: status_code={status} body={}",
                String::from_utf8_lossy(&body)
            );
            return Ok(FiredResult {
                status,
                headers: collector.finish(),
                body_decoded: body.clone(),
                body,
                elapsed: started.elapsed().as_secs_f64(),
                request_id: spec.request_id().clone(),
                connect_to: spec.connect_to().map(|c| c.as_str().to_string()),
                request_headers: outgoing,
            });
        }
        Ok(Err(e)) => return Err(ws_error(url_str, e)),
        Ok(Ok(connected)) => connected,
    };

    let mut collector = HeaderCollector::new();
    collector.record_map(response.headers());

    let message = match spec.payload() {
        None => Message::text(DEFAULT_WS_MESSAGE),
        Some(payload) => match std::str::from_utf8(payload) {
            Ok(text) => Message::text(text.to_string()),
            Err(_) => Message::binary(payload.to_vec()),
        },
    };
    socket
        .send(message)
        .await
        .map_err(|e| ws_error(url_str, e))?;

    let receive = async {
        while let Some(frame) = socket.next().await {
            match frame? {
                msg @ (Message::Text(_) | Message::Binary(_)) => {
                    return Ok(Some(msg.into_data().to_vec()))
                }
                Message::Close(_) => return Ok(None),
                // Ping/pong are answered by the library
                _ => continue,
            }
        }
        Ok::<_, tungstenite::Error>(None)
    };

    let reply = match timeout(WS_TIMEOUT, receive).await {
        Err(_) => {
            return Err(TransportError::Timeout {
                url: url_str.to_string(),
                step: "WebSocket reply",
                after: WS_TIMEOUT,
            })
        }
        Ok(Err(e)) => return Err(ws_error(url_str, e)),
        Ok(Ok(None)) => {
            return Err(TransportError::NoReply {
                url: url_str.to_string(),
            })
        }
        Ok(Ok(Some(reply))) => reply,
    };
    let elapsed = started.elapsed().as_secs_f64();

    if let Err(e) = socket.close(None).await {
        debug!("Closing WebSocket {url_str}: {e}");
    }

    if spec.verbose() {
        info!("< {} ({elapsed:.3}s)", String::from_utf8_lossy(&reply));
    }

    Ok(FiredResult {
        status: 200,
        headers: collector.finish(),
        body_decoded: reply.clone(),
        body: reply,
        elapsed,
        request_id: spec.request_id().clone(),
        connect_to: spec.connect_to().map(|c| c.as_str().to_string()),
        request_headers: outgoing,
    })
}
