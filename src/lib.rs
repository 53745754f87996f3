//! http_test library: declarative HTTP/WebSocket conformance testing
//!
//! Test cases are data: a request (URL, method, headers, payload) and a set of
//! expectations on the response (status, headers, timing, body). This library
//! fires the requests over HTTP(S) or WebSocket, decodes compressed bodies and
//! reduces every response to a pass/fail [`Verdict`]. A connect-to override
//! sends the same request to one specific backend and compares its body with
//! the one served in production.
//!
//! # Example
//!
//! ```no_run
//! use http_test::{check, Config, RequestSpec, RequirementSet};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let spec = RequestSpec::new("https://httpbin.org/get")
//!     .with_header("Accept: application/json");
//! let requirements = RequirementSet::new()
//!     .with_status(200)
//!     .with_header("content-type: application/json")?
//!     .with_timing("5000ms")?;
//!
//! let result = spec.fire(&config).await?;
//! check(&result, &requirements, &config.template())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod compare;
pub mod config;
pub mod decode;
pub mod error_handling;
pub mod initialization;
pub mod matcher;
pub mod request;
pub mod runner;
pub mod spec_file;
pub mod template;
pub mod transport;
mod verdict;

// Re-export public API
pub use compare::fire_and_compare;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{AssertionFailure, Failure, TransportError};
pub use matcher::{check, RequirementSet};
pub use request::{FiredResult, RequestId, RequestSpec};
pub use runner::{run_spec_files, RunReport, TestCase};
pub use template::Template;
pub use transport::ConnectTo;
pub use verdict::Verdict;
