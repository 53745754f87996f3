//! Assertion matching.
//!
//! Evaluates a [`RequirementSet`] against one [`FiredResult`]. Requirements are
//! checked in a fixed order (status, headers, timing, body) and evaluation
//! stops at the first one that fails.

mod requirements;

use log::debug;

use crate::config::MAX_BODY_PREVIEW_BYTES;
use crate::error_handling::AssertionFailure;
use crate::request::FiredResult;
use crate::template::Template;

pub use requirements::{HeaderExpectation, Requirement, RequirementSet, TimingCeiling};

/// Checks `result` against `requirements`, returning the first failure.
///
/// Header names and values compare case-insensitively; an absent header is
/// treated as an empty value. Timing must be strictly below the ceiling. Body
/// substrings are searched in the decoded bytes. Expected header values and
/// body substrings go through `template` first.
///
/// # Errors
///
/// Returns the [`AssertionFailure`] of the first unmet requirement.
pub fn check(
    result: &FiredResult,
    requirements: &RequirementSet,
    template: &Template,
) -> Result<(), AssertionFailure> {
    for requirement in requirements.requirements() {
        check_one(result, requirement, template)?;
    }
    debug!("{} satisfied all requirements", result.request_id);
    Ok(())
}

fn check_one(
    result: &FiredResult,
    requirement: Requirement<'_>,
    template: &Template,
) -> Result<(), AssertionFailure> {
    match requirement {
        Requirement::Status(expected) => {
            if result.status != expected {
                return Err(AssertionFailure::Status {
                    expected,
                    observed: result.status,
                });
            }
        }
        Requirement::Header(header) => {
            let expected = template.apply(header.expected());
            let observed = result
                .header(header.name())
                .map(|value| value.joined())
                .unwrap_or_default();
            if !observed.to_lowercase().contains(&expected.to_lowercase()) {
                return Err(AssertionFailure::Header {
                    name: header.name().to_string(),
                    expected,
                    observed,
                });
            }
        }
        Requirement::Timing(ceiling) => {
            if result.elapsed >= ceiling.seconds() {
                return Err(AssertionFailure::Timing {
                    ceiling: ceiling.raw().to_string(),
                    ceiling_secs: ceiling.seconds(),
                    elapsed: result.elapsed,
                });
            }
        }
        Requirement::Body(substring) => {
            let expected = template.apply(substring);
            if !contains_bytes(&result.body_decoded, expected.as_bytes()) {
                return Err(AssertionFailure::Body {
                    expected,
                    preview: body_preview(&result.body_decoded),
                });
            }
        }
    }
    Ok(())
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

fn body_preview(body: &[u8]) -> String {
    let end = body.len().min(MAX_BODY_PREVIEW_BYTES);
    let mut preview = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > end {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;
    use crate::decode::decode_body;
    use crate::request::RequestId;
    use crate::transport::HeaderCollector;

    fn fired(status: u16, headers: &[(&str, &str)], body: &[u8], elapsed: f64) -> FiredResult {
        let mut collector = HeaderCollector::new();
        for (name, value) in headers {
            collector.record(name, value);
        }
        FiredResult {
            status,
            headers: collector.finish(),
            body: body.to_vec(),
            body_decoded: decode_body(body),
            elapsed,
            request_id: RequestId::generate(),
            connect_to: None,
            request_headers: Vec::new(),
        }
    }

    fn template() -> Template {
        Template::new("example.com")
    }

    #[test]
    fn test_empty_set_passes() {
        let result = fired(503, &[], b"", 99.0);
        assert_eq!(check(&result, &RequirementSet::new(), &template()), Ok(()));
    }

    #[test]
    fn test_status_mismatch() {
        let result = fired(201, &[], b"", 0.1);
        let requirements = RequirementSet::new().with_status(200);
        let failure = check(&result, &requirements, &template()).expect_err("must fail");
        assert_eq!(
            failure,
            AssertionFailure::Status {
                expected: 200,
                observed: 201
            }
        );
        assert!(failure.to_string().contains("200"));
        assert!(failure.to_string().contains("201"));
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        let result = fired(200, &[("content-type", "application/json")], b"", 0.1);
        let requirements = RequirementSet::new()
            .with_header("Content-Type: Application/JSON")
            .expect("header");
        assert_eq!(check(&result, &requirements, &template()), Ok(()));
    }

    #[test]
    fn test_absent_header_observed_as_empty() {
        let result = fired(200, &[], b"", 0.1);
        let requirements = RequirementSet::new()
            .with_header("X-Cache: HIT")
            .expect("header");
        match check(&result, &requirements, &template()) {
            Err(AssertionFailure::Header { observed, .. }) => assert_eq!(observed, ""),
            other => panic!("expected header failure, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_valued_header_is_joined() {
        let result = fired(
            200,
            &[("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")],
            b"",
            0.1,
        );
        let requirements = RequirementSet::new()
            .with_header("set-cookie: a=1, b=2")
            .expect("header");
        assert_eq!(check(&result, &requirements, &template()), Ok(()));
    }

    #[test]
    fn test_header_expectation_uses_template() {
        let result = fired(
            200,
            &[("Access-Control-Allow-Origin", "https://www.example.com")],
            b"",
            0.1,
        );
        let requirements = RequirementSet::new()
            .with_header("access-control-allow-origin: https://www.{{domain}}")
            .expect("header");
        assert_eq!(check(&result, &requirements, &template()), Ok(()));
        assert!(check(&result, &requirements, &Template::new("other.org")).is_err());
    }

    #[test]
    fn test_body_expectation_uses_template() {
        let result = fired(200, &[], b"<a href=\"https://example.com/\">home</a>", 0.1);
        let requirements = RequirementSet::new().with_body("https://{{domain}}/");
        assert_eq!(check(&result, &requirements, &template()), Ok(()));
        match check(&result, &requirements, &Template::new("other.org")) {
            Err(AssertionFailure::Body { expected, .. }) => {
                assert_eq!(expected, "https://other.org/")
            }
            other => panic!("expected body failure, got {other:?}"),
        }
    }

    #[test]
    fn test_timing_is_strict() {
        let result = fired(200, &[], b"", 0.120);
        let fast = RequirementSet::new().with_timing("150ms").expect("timing");
        let slow = RequirementSet::new().with_timing("100ms").expect("timing");
        assert_eq!(check(&result, &fast, &template()), Ok(()));
        assert!(matches!(
            check(&result, &slow, &template()),
            Err(AssertionFailure::Timing { .. })
        ));

        let exact = fired(200, &[], b"", 0.5);
        let ceiling = RequirementSet::new().with_timing("500ms").expect("timing");
        assert!(check(&exact, &ceiling, &template()).is_err());
    }

    #[test]
    fn test_body_matches_decoded_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(br#"{"url": "https://httpbin.org/gzip"}"#)
            .expect("write");
        let gz = encoder.finish().expect("finish");

        let result = fired(200, &[("Content-Encoding", "gzip")], &gz, 0.1);
        let requirements = RequirementSet::new().with_body("\"url\"");
        assert_eq!(check(&result, &requirements, &template()), Ok(()));
    }

    #[test]
    fn test_body_missing_reports_preview() {
        let body = vec![b'x'; MAX_BODY_PREVIEW_BYTES * 2];
        let result = fired(200, &[], &body, 0.1);
        let requirements = RequirementSet::new().with_body("needle");
        match check(&result, &requirements, &template()) {
            Err(AssertionFailure::Body { expected, preview }) => {
                assert_eq!(expected, "needle");
                assert_eq!(preview.len(), MAX_BODY_PREVIEW_BYTES + 3);
            }
            other => panic!("expected body failure, got {other:?}"),
        }
    }

    #[test]
    fn test_fail_fast_reports_first_failure() {
        let result = fired(500, &[], b"", 10.0);
        let requirements = RequirementSet::new()
            .with_body("missing")
            .with_timing("1ms")
            .expect("timing")
            .with_status(200);
        assert!(matches!(
            check(&result, &requirements, &template()),
            Err(AssertionFailure::Status { .. })
        ));
    }

    #[test]
    fn test_contains_bytes() {
        assert!(contains_bytes(b"hello world", b"o w"));
        assert!(contains_bytes(b"abc", b""));
        assert!(!contains_bytes(b"ab", b"abc"));
    }
}
