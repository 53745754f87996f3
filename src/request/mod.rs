//! Request orchestration.
//!
//! [`RequestSpec`] describes one request; [`RequestSpec::fire`] is the only
//! place that picks a transport. Everything downstream (matcher, comparator)
//! works on the returned [`FiredResult`] and never looks at the URL again.

mod identity;

use log::debug;

use crate::config::{Config, DEFAULT_METHOD};
use crate::decode::decode_body;
use crate::error_handling::TransportError;
use crate::transport::{
    fire_http, fire_websocket, ConnectTo, HeaderValue, ResponseHeaders, Transport,
};

pub use identity::RequestId;

/// Immutable description of one request.
///
/// Built with the `with_*` methods; the request identity is generated at
/// construction and never changes.
///
/// # Examples
///
/// ```no_run
/// use http_test::{Config, RequestSpec};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let spec = RequestSpec::new("https://httpbin.org/post")
///     .with_method("POST")
///     .with_header("Content-Type: application/json")
///     .with_payload(r#"{"ping": true}"#);
/// let result = spec.fire(&Config::default()).await?;
/// println!("{} in {:.3}s", result.status, result.elapsed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    url: String,
    method: String,
    headers: Vec<String>,
    payload: Option<Vec<u8>>,
    http2: bool,
    connect_to: Option<ConnectTo>,
    verbose: bool,
    request_id: RequestId,
}

impl RequestSpec {
    /// A `GET` of `url` with no headers and a fresh identity.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: DEFAULT_METHOD.to_string(),
            headers: Vec::new(),
            payload: None,
            http2: false,
            connect_to: None,
            verbose: false,
            request_id: RequestId::generate(),
        }
    }

    /// Sets the method; any token is allowed, not only the standard ones.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Appends one raw `"Name: value"` header.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// Appends raw `"Name: value"` headers, in order.
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Sets the HTTP body or WebSocket message.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Forces HTTP/2 instead of HTTP/1.1.
    pub fn with_http2(mut self, http2: bool) -> Self {
        self.http2 = http2;
        self
    }

    /// Sends the TCP connection to `connect_to`, keeping Host and SNI.
    pub fn with_connect_to(mut self, connect_to: ConnectTo) -> Self {
        self.connect_to = Some(connect_to);
        self
    }

    /// Logs request and response headers at `info`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Same request through `connect_to`, under a child identity.
    pub fn via(&self, connect_to: ConnectTo, id_suffix: &str) -> Self {
        Self {
            connect_to: Some(connect_to),
            request_id: self.request_id.child(id_suffix),
            ..self.clone()
        }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Headers as given, without the identity header.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Body or message, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Whether HTTP/2 is forced.
    pub fn http2(&self) -> bool {
        self.http2
    }

    /// Connect-to override, if any.
    pub fn connect_to(&self) -> Option<&ConnectTo> {
        self.connect_to.as_ref()
    }

    /// Whether headers are logged.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Correlation token of this request.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Transport selected by the URL scheme.
    pub fn transport(&self) -> Transport {
        Transport::for_url(&self.url)
    }

    /// Headers actually sent: the configured headers plus the identity header.
    ///
    /// Built fresh on every call, so the configured list is never modified
    /// and the identity header appears exactly once.
    pub fn outgoing_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        let identity = self.request_id.header();
        if !headers.contains(&identity) {
            headers.push(identity);
        }
        headers
    }

    /// Executes the request and decodes the response body.
    ///
    /// `ws://`/`wss://` URLs go to the WebSocket executor, everything else to
    /// the HTTP executor. The raw body is kept as received; the decoded one is
    /// stored alongside it.
    ///
    /// # Errors
    ///
    /// Returns the executor's `TransportError` when no response was obtained.
    pub async fn fire(&self, config: &Config) -> Result<FiredResult, TransportError> {
        let transport = self.transport();
        debug!("{} {} via {:?}", self.method, self.url, transport);

        let result = match transport {
            Transport::Http => fire_http(self, config).await?,
            Transport::WebSocket => fire_websocket(self, config).await?,
        };

        Ok(FiredResult {
            body_decoded: decode_body(&result.body),
            ..result
        })
    }
}

/// Observable outcome of one fire.
#[derive(Debug, Clone)]
pub struct FiredResult {
    /// Response status (200 for a completed WebSocket exchange)
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: ResponseHeaders,
    /// Body exactly as received
    pub body: Vec<u8>,
    /// Body after gzip/Brotli decoding (equal to `body` when not compressed)
    pub body_decoded: Vec<u8>,
    /// Wall-clock seconds from sending to the end of the body
    pub elapsed: f64,
    /// Identity the request was sent with
    pub request_id: RequestId,
    /// Connect-to override used, if any
    pub connect_to: Option<String>,
    /// Request headers sent, identity header included
    pub request_headers: Vec<String>,
}

impl FiredResult {
    /// Looks a response header up by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }
}
