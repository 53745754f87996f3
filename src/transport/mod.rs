//! Transport clients.
//!
//! Two independent executors behind one result type:
//! - `http`: HTTP/1.1 or HTTP/2 over TCP or TLS (`reqwest`)
//! - `websocket`: one message out, one message back (`tokio-tungstenite`)
//!
//! Both honour the connect-to override and verify TLS against webpki roots.

mod connect_to;
mod headers;
mod http;
mod websocket;

pub use connect_to::{ConnectPlan, ConnectTo};
pub use headers::{split_header, HeaderCollector, HeaderValue, ResponseHeaders};
pub use http::fire_http;
pub use websocket::{fire_websocket, select_origin_header};

/// Which executor handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// `http://`, `https://` and anything that is not a WebSocket scheme
    Http,
    /// `ws://` and `wss://`
    WebSocket,
}

impl Transport {
    /// Selects the transport from the URL scheme.
    ///
    /// Only `ws`/`wss` (case-insensitive) select the WebSocket executor;
    /// every other URL, including unparseable ones, goes to HTTP, which then
    /// reports the bad URL itself.
    pub fn for_url(url: &str) -> Self {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme).unwrap_or("");
        if scheme.eq_ignore_ascii_case("ws") || scheme.eq_ignore_ascii_case("wss") {
            Transport::WebSocket
        } else {
            Transport::Http
        }
    }
}
