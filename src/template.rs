//! Test-domain placeholder substitution.

use crate::config::DOMAIN_PLACEHOLDER;

/// Replaces [`DOMAIN_PLACEHOLDER`] with a configured domain.
///
/// Built once from [`Config`](crate::Config) and handed to whoever needs to
/// expand URLs, headers or expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    domain: String,
}

impl Template {
    /// Creates a substitution for `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// The domain that replaces the placeholder.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns `input` with every placeholder replaced.
    pub fn apply(&self, input: &str) -> String {
        input.replace(DOMAIN_PLACEHOLDER, &self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let template = Template::new("staging.example.org");
        assert_eq!(
            template.apply("https://{{domain}}/a?ref={{domain}}"),
            "https://staging.example.org/a?ref=staging.example.org"
        );
    }

    #[test]
    fn test_apply_without_placeholder_is_identity() {
        let template = Template::new("x.test");
        assert_eq!(template.apply("Host: api.test"), "Host: api.test");
    }

    #[test]
    fn test_apply_leaves_similar_tokens_alone() {
        let template = Template::new("x.test");
        assert_eq!(template.apply("{{ domain }} {domain}"), "{{ domain }} {domain}");
    }
}
