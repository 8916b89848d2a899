//! Selector reverse-matching
//!
//! A scan's `scanAnnotationSelector` is a label-selector expression, but its
//! keys are resolved against the *finding* under consideration rather than
//! the scan's own labels: the parse definition maps each selector key to a
//! dotted path inside the finding. Keys without a mapping fall back to the
//! scan's own annotation value, so selectors can mix finding-derived and
//! static constraints.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::{Finding, LabelSelector, SelectorOperator};

use super::value::{lookup_path, scalar_to_string};

/// Decide whether the parent scan's annotation selector accepts a finding.
///
/// An absent or empty selector always matches. An unresolvable key fails its
/// requirement (except `DoesNotExist`, which it satisfies) - never an error,
/// since a rule should simply not trigger rather than crash the pass.
pub fn is_reverse_match(
    selector: Option<&LabelSelector>,
    scan_annotations: &BTreeMap<String, String>,
    finding: &Finding,
    mappings: &BTreeMap<String, String>,
) -> bool {
    let Some(selector) = selector else {
        return true;
    };
    if selector.is_empty() {
        return true;
    }

    // Mapped paths address the finding's JSON shape.
    let finding_json = serde_json::to_value(finding).unwrap_or(Value::Null);
    let resolve = |key: &str| -> Option<String> {
        match mappings.get(key) {
            Some(path) => lookup_path(&finding_json, path).and_then(scalar_to_string),
            None => scan_annotations.get(key).cloned(),
        }
    };

    let labels_hold = selector
        .match_labels
        .iter()
        .all(|(key, want)| resolve(key).as_deref() == Some(want.as_str()));

    let expressions_hold = selector.match_expressions.iter().all(|requirement| {
        let resolved = resolve(&requirement.key);
        match requirement.operator {
            SelectorOperator::In => resolved.is_some_and(|v| requirement.values.contains(&v)),
            SelectorOperator::NotIn => resolved.is_some_and(|v| !requirement.values.contains(&v)),
            SelectorOperator::Exists => resolved.is_some(),
            SelectorOperator::DoesNotExist => resolved.is_none(),
        }
    });

    labels_hold && expressions_hold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabelSelectorRequirement;

    fn finding() -> Finding {
        Finding::new("f-1", "Open Port 5601/tcp", "Open Port")
            .with_attribute("port", 5601)
            .with_attribute("service", "http")
            .with_attribute("hostname", "kibana.internal")
    }

    fn mappings() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("service".to_string(), "attributes.service".to_string()),
            ("port".to_string(), "attributes.port".to_string()),
        ])
    }

    fn selector_in(key: &str, values: &[&str]) -> LabelSelector {
        LabelSelector {
            match_expressions: vec![LabelSelectorRequirement {
                key: key.to_string(),
                operator: SelectorOperator::In,
                values: values.iter().map(|v| v.to_string()).collect(),
            }],
            ..LabelSelector::default()
        }
    }

    #[test]
    fn test_absent_selector_matches_everything() {
        assert!(is_reverse_match(
            None,
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
        assert!(is_reverse_match(
            Some(&LabelSelector::default()),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
    }

    #[test]
    fn test_mapped_key_resolves_from_finding() {
        let selector = selector_in("service", &["http", "https"]);
        assert!(is_reverse_match(
            Some(&selector),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));

        let rejecting = selector_in("service", &["ssh"]);
        assert!(!is_reverse_match(
            Some(&rejecting),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
    }

    #[test]
    fn test_numeric_attribute_compares_as_string() {
        let selector = LabelSelector {
            match_labels: BTreeMap::from([("port".to_string(), "5601".to_string())]),
            ..LabelSelector::default()
        };
        assert!(is_reverse_match(
            Some(&selector),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
    }

    #[test]
    fn test_unmapped_key_falls_back_to_scan_annotations() {
        let selector = LabelSelector {
            match_labels: BTreeMap::from([("team".to_string(), "security".to_string())]),
            ..LabelSelector::default()
        };
        let annotations = BTreeMap::from([("team".to_string(), "security".to_string())]);
        assert!(is_reverse_match(
            Some(&selector),
            &annotations,
            &finding(),
            &mappings()
        ));
        assert!(!is_reverse_match(
            Some(&selector),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
    }

    #[test]
    fn test_unresolved_key_fails_the_requirement() {
        // Mapping points somewhere the finding doesn't have.
        let mappings =
            BTreeMap::from([("banner".to_string(), "attributes.banner".to_string())]);
        let selector = selector_in("banner", &["Apache"]);
        assert!(!is_reverse_match(
            Some(&selector),
            &BTreeMap::new(),
            &finding(),
            &mappings
        ));
    }

    #[test]
    fn test_does_not_exist_operator() {
        let selector = LabelSelector {
            match_expressions: vec![LabelSelectorRequirement {
                key: "banner".to_string(),
                operator: SelectorOperator::DoesNotExist,
                values: vec![],
            }],
            ..LabelSelector::default()
        };
        assert!(is_reverse_match(
            Some(&selector),
            &BTreeMap::new(),
            &finding(),
            &BTreeMap::new()
        ));

        let present = LabelSelector {
            match_expressions: vec![LabelSelectorRequirement {
                key: "service".to_string(),
                operator: SelectorOperator::DoesNotExist,
                values: vec![],
            }],
            ..LabelSelector::default()
        };
        assert!(!is_reverse_match(
            Some(&present),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
    }

    #[test]
    fn test_not_in_requires_a_resolved_value() {
        let selector = LabelSelector {
            match_expressions: vec![LabelSelectorRequirement {
                key: "service".to_string(),
                operator: SelectorOperator::NotIn,
                values: vec!["ssh".to_string()],
            }],
            ..LabelSelector::default()
        };
        assert!(is_reverse_match(
            Some(&selector),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));

        // Unresolvable key: the constraint fails rather than trivially holds.
        let unresolved = LabelSelector {
            match_expressions: vec![LabelSelectorRequirement {
                key: "missing".to_string(),
                operator: SelectorOperator::NotIn,
                values: vec!["ssh".to_string()],
            }],
            ..LabelSelector::default()
        };
        assert!(!is_reverse_match(
            Some(&unresolved),
            &BTreeMap::new(),
            &finding(),
            &mappings()
        ));
    }
}
