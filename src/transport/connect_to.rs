//! Connect-to override: send the TCP connection somewhere else while keeping
//! the original Host header and TLS server name.

use std::net::{IpAddr, SocketAddr};

use tokio::time::timeout;
use url::{Host, Position, Url};

use crate::config::DNS_TIMEOUT;
use crate::error_handling::TransportError;

/// A parsed connect-to override.
///
/// Accepted forms:
/// - `ADDR` (IP literal or hostname), keeps the URL's port
/// - `ADDR:PORT`
/// - `[V6]` or `[V6]:PORT`
/// - curl's `HOST:PORT:ADDR:PORT`, where the first two fields are ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTo {
    raw: String,
    host: String,
    port: Option<u16>,
}

impl ConnectTo {
    /// Parses an override.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ConnectTo` if the address is empty, the port
    /// is not a number, or the form is not recognised.
    pub fn parse(raw: &str) -> Result<Self, TransportError> {
        let invalid = |reason: &str| TransportError::ConnectTo {
            target: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty address"));
        }

        let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid("missing ']' after IPv6 address"))?;
            let port = match after {
                "" => None,
                _ => Some(
                    after
                        .strip_prefix(':')
                        .ok_or_else(|| invalid("unexpected text after ']'"))?,
                ),
            };
            (host, port)
        } else if trimmed.parse::<IpAddr>().is_ok() {
            (trimmed, None)
        } else {
            let fields: Vec<&str> = trimmed.split(':').collect();
            match fields.as_slice() {
                [host] => (*host, None),
                [host, port] => (*host, Some(*port)),
                [_, _, host, port] => (*host, Some(*port)),
                _ => return Err(invalid("expected ADDR, ADDR:PORT or HOST:PORT:ADDR:PORT")),
            }
        };

        if host.is_empty() {
            return Err(invalid("empty address"));
        }
        let port = match port {
            None | Some("") => None,
            Some(port) => Some(
                port.parse::<u16>()
                    .map_err(|_| invalid(&format!("invalid port '{port}'")))?,
            ),
        };

        Ok(Self {
            raw: trimmed.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// The override as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Address part (IP literal or hostname).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if any.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Resolves the override to socket addresses on `port`.
    ///
    /// IP literals are used as is; hostnames go through the system resolver,
    /// bounded by [`DNS_TIMEOUT`].
    pub async fn resolve(&self, port: u16) -> Result<Vec<SocketAddr>, TransportError> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let failed = |reason: String| TransportError::ConnectTo {
            target: self.raw.clone(),
            reason,
        };
        let addrs: Vec<SocketAddr> =
            match timeout(DNS_TIMEOUT, tokio::net::lookup_host((self.host.as_str(), port))).await {
                Err(_) => {
                    return Err(failed(format!(
                        "resolution timed out after {}s",
                        DNS_TIMEOUT.as_secs()
                    )))
                }
                Ok(Err(e)) => return Err(failed(format!("resolution failed: {e}"))),
                Ok(Ok(addrs)) => addrs.collect(),
            };

        if addrs.is_empty() {
            return Err(TransportError::ConnectTo {
                target: self.raw.clone(),
                reason: "resolved to no addresses".to_string(),
            });
        }
        Ok(addrs)
    }

    /// Works out how to reach `url` through this override.
    ///
    /// The returned plan keeps the URL's hostname (so SNI is unchanged) and,
    /// whenever the URL itself has to be touched, carries the original
    /// authority for the `Host` header.
    pub async fn plan(&self, url: &Url) -> Result<ConnectPlan, TransportError> {
        let url_port = url.port_or_known_default().ok_or_else(|| {
            TransportError::InvalidRequest(format!("no port known for URL {url}"))
        })?;
        let port = self.port.unwrap_or(url_port);
        let addrs = self.resolve(port).await?;
        let original_authority = url[Position::BeforeHost..Position::AfterPort].to_string();

        let mut request_url = url.clone();
        let mut host_header = None;
        let mut resolve = None;

        match url.host() {
            Some(Host::Domain(domain)) => {
                resolve = Some((domain.to_string(), addrs.clone()));
            }
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
                // No DNS step to hook, so the URL must name the new address
                request_url
                    .set_ip_host(addrs[0].ip())
                    .map_err(|()| TransportError::InvalidRequest(format!("cannot rewrite host of {url}")))?;
                host_header = Some(original_authority.clone());
            }
            None => {
                return Err(TransportError::InvalidRequest(format!(
                    "URL has no host: {url}"
                )))
            }
        }

        if port != url_port {
            request_url
                .set_port(Some(port))
                .map_err(|()| TransportError::InvalidRequest(format!("cannot rewrite port of {url}")))?;
            host_header = Some(original_authority);
        }

        Ok(ConnectPlan {
            request_url,
            host_header,
            resolve,
            addrs,
        })
    }
}

impl std::fmt::Display for ConnectTo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// How to reach a URL through a connect-to override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPlan {
    /// URL to hand to the client (host/port possibly rewritten)
    pub request_url: Url,
    /// `Host` header to send when the URL was rewritten
    pub host_header: Option<String>,
    /// DNS override: hostname of the URL and the addresses to use for it
    pub resolve: Option<(String, Vec<SocketAddr>)>,
    /// Addresses to open the TCP connection to
    pub addrs: Vec<SocketAddr>,
}
