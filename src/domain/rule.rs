//! Cascading-rule resource - policy mapping finding patterns to follow-up scans

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::container::{EnvVar, InitContainer, Volume, VolumeMount};
use super::keys;
use super::meta::ObjectMeta;
use super::selector::LabelSelector;

/// A named policy resource: when a finding looks like *this*, launch a scan
/// shaped like *that*.
///
/// Rules are immutable policy input. The engine clones a rule per
/// (rule, finding) pair before rendering its templates, so one rule can
/// serve many findings in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadingRule {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: CascadingRuleSpec,
}

fn default_api_version() -> String {
    keys::RULE_API_VERSION.to_string()
}

fn default_kind() -> String {
    keys::RULE_KIND.to_string()
}

impl CascadingRule {
    /// Create a rule with the given name, match disjunction, and target spec.
    pub fn new(
        name: impl Into<String>,
        matches: Matches,
        scan_spec: ScanTemplate,
    ) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::named(name),
            spec: CascadingRuleSpec {
                matches,
                scan_spec,
                scan_annotations: BTreeMap::new(),
                scan_labels: BTreeMap::new(),
            },
        }
    }

    /// Rule name as recorded in scan chains.
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadingRuleSpec {
    /// Disjunction of finding predicates; one hit triggers the rule.
    pub matches: Matches,
    /// Template of the scan to launch on a match.
    pub scan_spec: ScanTemplate,
    /// Annotation templates attached to the produced scan.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scan_annotations: BTreeMap<String, String>,
    /// Label templates attached to the produced scan.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scan_labels: BTreeMap<String, String>,
}

/// Match specification: a finding triggers the rule iff it satisfies at
/// least one predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matches {
    #[serde(default)]
    pub any_of: Vec<FindingPredicate>,
}

impl Matches {
    pub fn any_of(predicates: impl IntoIterator<Item = FindingPredicate>) -> Self {
        Self {
            any_of: predicates.into_iter().collect(),
        }
    }
}

/// Partial-structure match against a [`super::Finding`].
///
/// Every present field must match the finding's corresponding field - either
/// exactly, or (for string fields) by `*`/`?` wildcard. `severity` is a
/// string here, not the typed enum, so patterns like `"HI*"` stay
/// expressible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingPredicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Partial match against the finding's attribute map; nested objects
    /// match partially, scalars and arrays exactly (or by wildcard for
    /// string leaves).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl FindingPredicate {
    /// Predicate constraining a single attribute.
    pub fn attribute(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(key.into(), value.into());
        Self {
            attributes,
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// The scan specification a rule produces, before templating and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTemplate {
    /// May itself be a template (e.g. `"{{attributes.protocol}}-probe"`).
    pub scan_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<InitContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_selector: Option<LabelSelector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_manifest_round_trip() {
        let yaml = r#"
apiVersion: cascading.cascade.dev/v1
kind: CascadingRule
metadata:
  name: nikto-on-http
spec:
  matches:
    anyOf:
      - attributes:
          service: http
      - attributes:
          service: https
  scanSpec:
    scanType: nikto
    parameters: ["-h", "{{$.hostOrIP}}", "-p", "{{attributes.port}}"]
  scanAnnotations:
    triggered-by: "{{name}}"
"#;
        let rule: CascadingRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.name(), "nikto-on-http");
        assert_eq!(rule.spec.matches.any_of.len(), 2);
        assert_eq!(rule.spec.scan_spec.scan_type, "nikto");
        assert_eq!(
            rule.spec.matches.any_of[0].attributes.get("service"),
            Some(&serde_json::json!("http"))
        );
    }

    #[test]
    fn test_predicate_builder() {
        let predicate = FindingPredicate::attribute("port", 22)
            .with_category("Open Port")
            .with_attribute("service", "ssh");
        assert_eq!(predicate.category.as_deref(), Some("Open Port"));
        assert_eq!(predicate.attributes.len(), 2);
    }
}
