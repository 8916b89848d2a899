//! Pod-level fragments carried through scan specs
//!
//! The engine never interprets volume or mount configuration - it only
//! templates literal env values, concatenates sequences during inheritance
//! merging, and filters by structural equality. Everything beyond the fields
//! it touches is kept as open JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One environment variable of a scan container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,
    /// Literal value; the only part the template engine renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// External reference (config-map/secret lookup), passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<serde_json::Value>,
}

impl EnvVar {
    /// Env var with a literal value.
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }
}

/// A volume offered to the scan's containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    /// Volume source configuration (emptyDir, secret, ...), untouched.
    #[serde(flatten)]
    pub config: BTreeMap<String, serde_json::Value>,
}

/// A mount point wiring a volume into a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
    #[serde(flatten)]
    pub config: BTreeMap<String, serde_json::Value>,
}

/// Container run before the scan container starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitContainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
