//! Structural finding matching
//!
//! A predicate is a partial finding: every field it declares must match the
//! finding's corresponding field. Matching runs two passes - exact equality
//! first, then wildcard comparison where `*` and `?` glob over string
//! fields (case-sensitive). Non-string values only ever match exactly.

use globset::GlobBuilder;
use serde_json::Value;

use crate::domain::{Finding, FindingPredicate};

/// `true` iff the finding satisfies the predicate, exactly or by wildcard.
pub fn predicate_matches(finding: &Finding, predicate: &FindingPredicate) -> bool {
    matches_with(finding, predicate, Comparison::Exact)
        || matches_with(finding, predicate, Comparison::Wildcard)
}

#[derive(Clone, Copy)]
enum Comparison {
    Exact,
    Wildcard,
}

impl Comparison {
    fn strings(self, actual: &str, expected: &str) -> bool {
        match self {
            Comparison::Exact => actual == expected,
            Comparison::Wildcard => wildcard_eq(actual, expected),
        }
    }
}

fn matches_with(finding: &Finding, predicate: &FindingPredicate, cmp: Comparison) -> bool {
    let field = |actual: Option<&str>, expected: &Option<String>| match expected {
        Some(want) => actual.is_some_and(|have| cmp.strings(have, want)),
        None => true,
    };

    field(Some(finding.id.as_str()), &predicate.id)
        && field(Some(finding.name.as_str()), &predicate.name)
        && field(Some(finding.category.as_str()), &predicate.category)
        && field(finding.description.as_deref(), &predicate.description)
        && field(finding.location.as_deref(), &predicate.location)
        && field(finding.severity.map(|s| s.as_str()), &predicate.severity)
        && predicate.attributes.iter().all(|(key, want)| {
            finding
                .attributes
                .get(key)
                .is_some_and(|have| value_matches(have, want, cmp))
        })
}

/// Recursive partial match over attribute values: objects match when every
/// expected entry matches, string leaves go through the comparison mode,
/// everything else by equality.
fn value_matches(actual: &Value, expected: &Value, cmp: Comparison) -> bool {
    match (actual, expected) {
        (Value::Object(have), Value::Object(want)) => want
            .iter()
            .all(|(key, w)| have.get(key).is_some_and(|h| value_matches(h, w, cmp))),
        (Value::String(have), Value::String(want)) => cmp.strings(have, want),
        _ => actual == expected,
    }
}

/// Case-sensitive `*`/`?` comparison. A malformed pattern never matches and
/// never propagates an error - a rule should simply not trigger.
fn wildcard_eq(actual: &str, pattern: &str) -> bool {
    match GlobBuilder::new(pattern).literal_separator(false).build() {
        Ok(glob) => glob.compile_matcher().is_match(actual),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use serde_json::json;

    fn finding() -> Finding {
        Finding::new("f-1", "Open Port 443/tcp", "Open Port")
            .with_severity(Severity::Informational)
            .with_attribute("port", 443)
            .with_attribute("service", "https")
            .with_attribute("tls", json!({ "version": "1.3", "issuer": "Let's Encrypt" }))
    }

    #[test]
    fn test_exact_attribute_match() {
        let predicate = FindingPredicate::attribute("service", "https");
        assert!(predicate_matches(&finding(), &predicate));
    }

    #[test]
    fn test_nested_partial_match() {
        let predicate = FindingPredicate::attribute("tls", json!({ "version": "1.3" }));
        assert!(predicate_matches(&finding(), &predicate));

        let mismatch = FindingPredicate::attribute("tls", json!({ "version": "1.2" }));
        assert!(!predicate_matches(&finding(), &mismatch));
    }

    #[test]
    fn test_wildcard_match() {
        let predicate = FindingPredicate::default().with_category("Open *");
        assert!(predicate_matches(&finding(), &predicate));

        let nested = FindingPredicate::attribute("tls", json!({ "issuer": "Let's *" }));
        assert!(predicate_matches(&finding(), &nested));
    }

    #[test]
    fn test_wildcard_is_case_sensitive() {
        let predicate = FindingPredicate::default().with_category("open *");
        assert!(!predicate_matches(&finding(), &predicate));
    }

    #[test]
    fn test_non_string_requires_exact_equality() {
        assert!(predicate_matches(
            &finding(),
            &FindingPredicate::attribute("port", 443)
        ));
        assert!(!predicate_matches(
            &finding(),
            &FindingPredicate::attribute("port", "443")
        ));
        assert!(!predicate_matches(
            &finding(),
            &FindingPredicate::attribute("port", 80)
        ));
    }

    #[test]
    fn test_severity_matches_as_string() {
        let predicate = FindingPredicate {
            severity: Some("INFO*".into()),
            ..FindingPredicate::default()
        };
        assert!(predicate_matches(&finding(), &predicate));
    }

    #[test]
    fn test_missing_attribute_never_matches() {
        let predicate = FindingPredicate::attribute("banner", "*");
        assert!(!predicate_matches(&finding(), &predicate));
    }

    #[test]
    fn test_malformed_pattern_is_a_non_match() {
        let predicate = FindingPredicate::attribute("service", "http[s");
        assert!(!predicate_matches(&finding(), &predicate));
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        assert!(predicate_matches(&finding(), &FindingPredicate::default()));
    }
}
