//! YAML spec files.
//!
//! ```yaml
//! base_url: "https://httpbin.org"
//! tests:
//!   - url: "/get"
//!     description: "Test GET request"
//!     method: "GET"
//!     headers:
//!       - "Accept: application/json"
//!     match:
//!       status: 200
//!       headers:
//!         - "content-type: application/json"
//!       timing: 5000ms
//! ```

use std::path::Path;

use std::fmt;

use anyhow::{bail, Context, Result};
use log::debug;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;

use crate::config::{Config, DEFAULT_METHOD};
use crate::matcher::RequirementSet;
use crate::request::RequestSpec;
use crate::runner::TestCase;
use crate::template::Template;
use crate::transport::ConnectTo;

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

/// Request body as written in a spec file: a string, a list of byte values,
/// or a YAML `!!binary` scalar.
#[derive(Debug, PartialEq, Eq)]
struct Payload(Vec<u8>);

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = Payload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or a list of bytes")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Payload, E> {
                Ok(Payload(value.as_bytes().to_vec()))
            }

            fn visit_bytes<E: de::Error>(self, value: &[u8]) -> std::result::Result<Payload, E> {
                Ok(Payload(value.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(
                self,
                value: Vec<u8>,
            ) -> std::result::Result<Payload, E> {
                Ok(Payload(value))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Payload, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                Ok(Payload(bytes))
            }
        }

        deserializer.deserialize_any(PayloadVisitor)
    }
}

impl From<Payload> for Vec<u8> {
    fn from(payload: Payload) -> Self {
        payload.0
    }
}

/// Top level of a spec file.
#[derive(Debug, Deserialize)]
struct SpecFile {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    connect_to: Option<String>,
    #[serde(default)]
    tests: Vec<TestRecord>,
}

/// One entry of `tests:`.
#[derive(Debug, Deserialize)]
struct TestRecord {
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    http2: bool,
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    payload: Option<Payload>,
    #[serde(default, rename = "match")]
    requirements: RequirementSet,
}

/// Appends a relative `url` to `base_url`; absolute URLs are kept.
fn join_url(base_url: Option<&str>, url: &str) -> Result<String> {
    if url.contains("://") {
        return Ok(url.to_string());
    }
    let Some(base) = base_url else {
        bail!("relative URL '{url}' but no base_url is set");
    };
    let base = base.trim_end_matches('/');
    match url {
        "" => Ok(base.to_string()),
        _ if url.starts_with('/') || url.starts_with('?') => Ok(format!("{base}{url}")),
        _ => Ok(format!("{base}/{url}")),
    }
}

fn build_test(
    record: TestRecord,
    base_url: Option<&str>,
    connect_to: Option<&ConnectTo>,
    template: &Template,
) -> Result<TestCase> {
    let url = template.apply(&join_url(base_url, &record.url)?);
    let headers: Vec<String> = record.headers.iter().map(|h| template.apply(h)).collect();

    let mut spec = RequestSpec::new(url)
        .with_method(record.method)
        .with_headers(headers)
        .with_http2(record.http2)
        .with_verbose(record.verbose);
    if let Some(payload) = record.payload {
        spec = spec.with_payload(payload);
    }

    let name = record
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| spec.url().to_string());

    Ok(TestCase {
        name,
        spec,
        requirements: record.requirements,
        connect_to: connect_to.cloned(),
    })
}

/// Parses spec-file YAML into test cases.
///
/// `source` names the input in error messages. A connect-to override in
/// `config` replaces the file's `connect_to`.
///
/// # Errors
///
/// Returns an error on invalid YAML, an unusable connect-to override, or a
/// relative URL without `base_url`.
pub fn parse_spec(yaml: &str, source: &str, config: &Config) -> Result<Vec<TestCase>> {
    let file: SpecFile =
        serde_yaml::from_str(yaml).with_context(|| format!("Failed to parse spec file {source}"))?;
    let template = config.template();
    debug!("Expanding placeholders in {source} with domain '{}'", template.domain());

    let connect_to = config
        .connect_to
        .as_deref()
        .or(file.connect_to.as_deref())
        .map(|raw| ConnectTo::parse(&template.apply(raw)))
        .transpose()
        .with_context(|| format!("Invalid connect_to in {source}"))?;
    let base_url = file.base_url.as_deref().map(|b| template.apply(b));

    file.tests
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            build_test(record, base_url.as_deref(), connect_to.as_ref(), &template)
                .with_context(|| format!("Invalid test #{} in {source}", index + 1))
        })
        .collect()
}

/// Reads and parses the spec file at `path`.
///
/// Any file name is accepted when given explicitly.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_spec_file(path: &Path, config: &Config) -> Result<Vec<TestCase>> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file {}", path.display()))?;
    parse_spec(&yaml, &path.display().to_string(), config)
}
