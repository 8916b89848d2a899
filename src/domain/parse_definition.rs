//! Parse-definition resource - selector key to finding attribute mapping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;

/// Declares, per scan type, where selector keys are read from inside a
/// finding when evaluating reverse matches.
///
/// A mapping entry like `host: attributes.hostname` makes a
/// `scanAnnotationSelector` key `host` compare against the finding's
/// `attributes.hostname` value. Keys without a mapping fall back to the
/// scan's own annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDefinition {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ParseDefinitionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDefinitionSpec {
    /// Selector key -> dotted path into the finding (e.g. `attributes.port`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector_attribute_mappings: BTreeMap<String, String>,
}

impl ParseDefinition {
    /// Definition with a single mapping entry.
    pub fn with_mapping(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.spec
            .selector_attribute_mappings
            .insert(key.into(), path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition_round_trip() {
        let yaml = r#"
metadata:
  name: nmap
spec:
  selectorAttributeMappings:
    host: attributes.hostname
    port: attributes.port
"#;
        let def: ParseDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            def.spec.selector_attribute_mappings.get("host"),
            Some(&"attributes.hostname".to_string())
        );
    }
}
