//! Requirement set types, as they appear under `match:` in a spec file.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::transport::split_header;

/// One `"Name: substring"` header expectation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HeaderExpectation {
    name: String,
    expected: String,
}

impl HeaderExpectation {
    /// Header name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substring the header value must contain, template not yet applied.
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

impl FromStr for HeaderExpectation {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, expected) = split_header(raw)
            .ok_or_else(|| format!("header expectation '{raw}' is not 'Name: value'"))?;
        Ok(Self {
            name: name.to_string(),
            expected: expected.to_string(),
        })
    }
}

impl TryFrom<String> for HeaderExpectation {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for HeaderExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.expected)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCeiling {
    Seconds(f64),
    Text(String),
}

/// Upper bound on a response's elapsed time.
///
/// Written as `"150ms"`, `"2s"` or a bare number of seconds. The original
/// text is kept for failure messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawCeiling")]
pub struct TimingCeiling {
    raw: String,
    seconds: f64,
}

impl TimingCeiling {
    /// A ceiling of `seconds`.
    pub fn from_secs(seconds: f64) -> Self {
        Self {
            raw: format!("{seconds}s"),
            seconds,
        }
    }

    /// Ceiling as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Ceiling in seconds.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

impl FromStr for TimingCeiling {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        let (number, scale) = if let Some(ms) = text.strip_suffix("ms") {
            (ms, 1000.0)
        } else if let Some(s) = text.strip_suffix('s') {
            (s, 1.0)
        } else {
            (text, 1.0)
        };

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| format!("invalid timing '{raw}', expected e.g. '150ms' or '2s'"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("invalid timing '{raw}', must be a positive duration"));
        }

        Ok(Self {
            raw: text.to_string(),
            seconds: value / scale,
        })
    }
}

impl TryFrom<RawCeiling> for TimingCeiling {
    type Error = String;

    fn try_from(raw: RawCeiling) -> Result<Self, Self::Error> {
        match raw {
            RawCeiling::Seconds(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                Ok(Self::from_secs(seconds))
            }
            RawCeiling::Seconds(seconds) => Err(format!("invalid timing {seconds}")),
            RawCeiling::Text(text) => text.parse(),
        }
    }
}

impl fmt::Display for TimingCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One requirement of a [`RequirementSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Requirement<'a> {
    /// Exact status code
    Status(u16),
    /// Header containing a substring
    Header(&'a HeaderExpectation),
    /// Elapsed time strictly below a ceiling
    Timing(&'a TimingCeiling),
    /// Decoded body containing a substring
    Body(&'a str),
}

/// Declarative expectations on one response.
///
/// An empty set always passes.
///
/// # Examples
///
/// ```
/// use http_test::RequirementSet;
///
/// let requirements = RequirementSet::new()
///     .with_status(200)
///     .with_header("Content-Type: application/json")
///     .expect("well-formed header")
///     .with_timing("150ms")
///     .expect("well-formed ceiling")
///     .with_body("\"url\"");
/// assert_eq!(requirements.expected_status(), Some(200));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementSet {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    headers: Vec<HeaderExpectation>,
    #[serde(default)]
    timing: Option<TimingCeiling>,
    #[serde(default)]
    body: Vec<String>,
}

impl RequirementSet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires this exact status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Requires a header; `raw` is `"Name: substring"`.
    ///
    /// # Errors
    ///
    /// Fails when `raw` has no colon or an empty name.
    pub fn with_header(mut self, raw: &str) -> Result<Self, String> {
        self.headers.push(raw.parse()?);
        Ok(self)
    }

    /// Requires the response faster than `raw` (`"150ms"`, `"2s"`, `"0.5"`).
    ///
    /// # Errors
    ///
    /// Fails when `raw` is not a duration.
    pub fn with_timing(mut self, raw: &str) -> Result<Self, String> {
        self.timing = Some(raw.parse()?);
        Ok(self)
    }

    /// Requires the decoded body to contain `substring`.
    pub fn with_body(mut self, substring: impl Into<String>) -> Self {
        self.body.push(substring.into());
        self
    }

    /// Expected status, if any.
    pub fn expected_status(&self) -> Option<u16> {
        self.status
    }

    /// True when nothing is required.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.headers.is_empty()
            && self.timing.is_none()
            && self.body.is_empty()
    }

    /// Requirements in evaluation order: status, headers, timing, body.
    pub fn requirements(&self) -> impl Iterator<Item = Requirement<'_>> {
        self.status
            .map(Requirement::Status)
            .into_iter()
            .chain(self.headers.iter().map(Requirement::Header))
            .chain(self.timing.iter().map(Requirement::Timing))
            .chain(self.body.iter().map(|s| Requirement::Body(s.as_str())))
    }
}
