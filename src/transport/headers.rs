//! Request header parsing and response header collection.

/// Value of one response header.
///
/// Headers seen once stay scalar; a repeated name folds into an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// Header seen once
    Single(String),
    /// Header seen several times, in arrival order
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// All values in arrival order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(value) => vec![value.as_str()],
            HeaderValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Values joined with `", "`, the way a proxy would fold them.
    pub fn joined(&self) -> String {
        match self {
            HeaderValue::Single(value) => value.clone(),
            HeaderValue::Multiple(values) => values.join(", "),
        }
    }
}

/// Response headers keyed by lower-cased name, in first-arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, HeaderValue)>,
}

impl ResponseHeaders {
    /// Looks a header up by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let name = name.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no header was received.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(lower-cased name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Accumulates response headers for exactly one fire.
///
/// A new collector is created at the start of every fire and consumed by
/// [`finish`](Self::finish), so headers can never leak from one fire into the
/// next.
#[derive(Debug, Default)]
pub struct HeaderCollector {
    headers: ResponseHeaders,
}

impl HeaderCollector {
    /// Starts an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one header; repeated names fold into a list.
    pub fn record(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        let entries = &mut self.headers.entries;

        match entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => {
                let folded = match std::mem::replace(existing, HeaderValue::Multiple(Vec::new())) {
                    HeaderValue::Single(first) => vec![first, value],
                    HeaderValue::Multiple(mut values) => {
                        values.push(value);
                        values
                    }
                };
                *existing = HeaderValue::Multiple(folded);
            }
            None => entries.push((name, HeaderValue::Single(value))),
        }
    }

    /// Records every entry of a `reqwest`/`http` header map, in order.
    pub fn record_map(&mut self, headers: &reqwest::header::HeaderMap) {
        for (name, value) in headers {
            let value: String = value.as_bytes().iter().map(|&b| b as char).collect();
            self.record(name.as_str(), &value);
        }
    }

    /// Hands the collected headers over.
    pub fn finish(self) -> ResponseHeaders {
        self.headers
    }
}

/// Splits a raw `"Name: value"` request header into trimmed parts.
///
/// Returns `None` when there is no colon or the name is empty.
pub fn split_header(raw: &str) -> Option<(&str, &str)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}
