//! Scan resource - one execution of a security tool

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::container::{EnvVar, InitContainer, Volume, VolumeMount};
use super::keys;
use super::meta::ObjectMeta;
use super::selector::LabelSelector;

/// A resource describing one execution of a security tool and its
/// configuration.
///
/// Scans are created externally when launched (parent or cascaded). The
/// engine reads them and synthesizes *new* child scans; the parent object
/// itself is never mutated except for a local working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: ScanSpec,
}

fn default_api_version() -> String {
    keys::SCAN_API_VERSION.to_string()
}

fn default_kind() -> String {
    keys::SCAN_KIND.to_string()
}

impl Scan {
    /// Create a named scan of the given type.
    pub fn new(name: impl Into<String>, scan_type: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::named(name),
            spec: ScanSpec {
                scan_type: scan_type.into(),
                ..ScanSpec::default()
            },
        }
    }

    /// Resource name; empty for unnamed (not yet created) scans.
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Annotation value, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    /// Cascade configuration; defaults (no selector, nothing inherited)
    /// when the scan declares none.
    pub fn cascades(&self) -> CascadeSpec {
        self.spec.cascades.clone().unwrap_or_default()
    }

    // Builder methods
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.metadata.uid = Some(uid.into());
        self
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.spec.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cascades(mut self, cascades: CascadeSpec) -> Self {
        self.spec.cascades = Some(cascades);
        self
    }

    pub fn with_env(mut self, env: EnvVar) -> Self {
        self.spec.env.push(env);
        self
    }
}

/// What to run and how to shape the scan job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSpec {
    /// Tool/profile identifier (e.g. `nmap`, `nikto`).
    pub scan_type: String,
    /// Ordered command-line parameters for the tool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    /// Cascade gating and inheritance policy, propagated to children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascades: Option<CascadeSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<InitContainer>,
    /// Restricts which hooks process this scan's results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_selector: Option<LabelSelector>,
}

/// Per-scan cascade configuration.
///
/// The selector gates which findings may trigger rules at all; the inherit
/// flags decide, per field group, whether a child combines the parent's
/// values with the rule's or takes the rule's only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSpec {
    /// Selector evaluated against finding attributes (reverse match).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_annotation_selector: Option<LabelSelector>,
    #[serde(default)]
    pub inherit_annotations: bool,
    #[serde(default)]
    pub inherit_labels: bool,
    #[serde(default)]
    pub inherit_env: bool,
    /// Governs volumes and volume mounts alike.
    #[serde(default)]
    pub inherit_volumes: bool,
    #[serde(default)]
    pub inherit_init_containers: bool,
    #[serde(default)]
    pub inherit_hook_selector: bool,
}

impl CascadeSpec {
    /// Policy that inherits every field group.
    pub fn inherit_all() -> Self {
        Self {
            scan_annotation_selector: None,
            inherit_annotations: true,
            inherit_labels: true,
            inherit_env: true,
            inherit_volumes: true,
            inherit_init_containers: true,
            inherit_hook_selector: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_manifest_round_trip() {
        let yaml = r#"
apiVersion: execution.cascade.dev/v1
kind: Scan
metadata:
  name: nmap-network-abcde
  annotations:
    cascading.cascade.dev/chain: "port-scan"
spec:
  scanType: nmap
  parameters: ["-p", "1-65535", "10.0.0.0/24"]
  cascades:
    inheritEnv: true
  env:
    - name: SCAN_DEPTH
      value: full
"#;
        let scan: Scan = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scan.name(), "nmap-network-abcde");
        assert_eq!(scan.spec.scan_type, "nmap");
        assert_eq!(scan.spec.parameters.len(), 3);
        assert!(scan.cascades().inherit_env);
        assert!(!scan.cascades().inherit_labels);
        assert_eq!(
            scan.annotation(keys::CHAIN_ANNOTATION),
            Some("port-scan")
        );

        // Defaults must not clutter the serialized output.
        let out = serde_yaml::to_string(&scan).unwrap();
        assert!(!out.contains("volumeMounts"));
        assert!(!out.contains("hookSelector"));
    }

    #[test]
    fn test_unnamed_scan_has_empty_name() {
        let spec = ScanSpec {
            scan_type: "nikto".into(),
            ..ScanSpec::default()
        };
        let scan = Scan {
            api_version: keys::SCAN_API_VERSION.into(),
            kind: keys::SCAN_KIND.into(),
            metadata: ObjectMeta::default(),
            spec,
        };
        assert_eq!(scan.name(), "");
    }
}
