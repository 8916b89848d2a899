//! File-backed collaborators
//!
//! Embedded in the orchestration service the engine is fed straight from the
//! resource API; the CLI and the integration tests implement the same traits
//! over plain manifest files instead. Scans, rules, and parse definitions
//! are YAML; findings arrive as the JSON array the result parsers emit.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{CascadingRule, Finding, ParseDefinition, Scan};
use crate::engine::ScanChain;
use crate::hook::{FindingsSource, RuleSource, ScanSink};

/// Errors loading resource manifests from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a scan manifest.
pub fn load_scan(path: &Path) -> Result<Scan, LoadError> {
    serde_yaml::from_str(&read_file(path)?).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load findings as the result parsers emit them: one JSON array.
pub fn load_findings(path: &Path) -> Result<Vec<Finding>, LoadError> {
    serde_json::from_str(&read_file(path)?).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load cascading rules: a YAML list, or `---`-separated documents.
pub fn load_rules(path: &Path) -> Result<Vec<CascadingRule>, LoadError> {
    let raw = read_file(path)?;
    if let Ok(rules) = serde_yaml::from_str::<Vec<CascadingRule>>(&raw) {
        return Ok(rules);
    }

    let mut rules = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&raw) {
        let rule = CascadingRule::deserialize(document).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        rules.push(rule);
    }
    Ok(rules)
}

/// Load a parse-definition manifest.
pub fn load_parse_definition(path: &Path) -> Result<ParseDefinition, LoadError> {
    serde_yaml::from_str(&read_file(path)?).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Findings read from a file on demand.
pub struct FileFindings {
    path: PathBuf,
}

impl FileFindings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FindingsSource for FileFindings {
    async fn findings(&self) -> Result<Vec<Finding>> {
        Ok(load_findings(&self.path)?)
    }
}

/// Rules held in memory, loaded from manifests up front.
pub struct StaticRules {
    rules: Vec<CascadingRule>,
    parse_definition: ParseDefinition,
}

impl StaticRules {
    pub fn new(rules: Vec<CascadingRule>, parse_definition: ParseDefinition) -> Self {
        Self {
            rules,
            parse_definition,
        }
    }

    /// Load rules and the optional parse definition from manifest files. A
    /// missing parse definition means no mappings, not an error.
    pub fn from_files(
        rules_path: &Path,
        parse_definition_path: Option<&Path>,
    ) -> Result<Self, LoadError> {
        let rules = load_rules(rules_path)?;
        let parse_definition = match parse_definition_path {
            Some(path) => load_parse_definition(path)?,
            None => ParseDefinition::default(),
        };
        Ok(Self::new(rules, parse_definition))
    }
}

#[async_trait]
impl RuleSource for StaticRules {
    async fn active_rules(&self, _scan: &Scan) -> Result<Vec<CascadingRule>> {
        Ok(self.rules.clone())
    }

    /// The orchestration API records which rule produced a scan; with plain
    /// files the last chain entry carries the same information.
    async fn applied_rule(&self, scan: &Scan) -> Result<Option<CascadingRule>> {
        let chain = ScanChain::of(scan);
        let Some(last) = chain.iter().last() else {
            return Ok(None);
        };
        Ok(self.rules.iter().find(|rule| rule.name() == last).cloned())
    }

    async fn parse_definition(&self, _scan: &Scan) -> Result<ParseDefinition> {
        Ok(self.parse_definition.clone())
    }
}

/// Sink that accumulates submissions in order. Test and dry-run stand-in.
#[derive(Default)]
pub struct CollectingSink {
    scans: Mutex<Vec<Scan>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything submitted so far, in submission order.
    pub fn take(&self) -> Vec<Scan> {
        std::mem::take(&mut *self.scans.lock().expect("lock"))
    }
}

#[async_trait]
impl ScanSink for CollectingSink {
    async fn submit(&self, scan: Scan) -> Result<()> {
        self.scans.lock().expect("lock").push(scan);
        Ok(())
    }
}

/// Sink that writes one manifest per scan into a directory, completing
/// `generateName` with a short unique suffix the way the resource store
/// would.
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl ScanSink for DirSink {
    async fn submit(&self, mut scan: Scan) -> Result<()> {
        let prefix = scan.metadata.generate_name.clone().unwrap_or_default();
        let mut suffix = uuid::Uuid::new_v4().simple().to_string();
        suffix.truncate(5);
        let name = format!("{prefix}{suffix}");

        scan.metadata.name = Some(name.clone());
        scan.metadata.generate_name = None;

        let manifest = serde_yaml::to_string(&scan)?;
        tokio::fs::write(self.dir.join(format!("{name}.yaml")), manifest).await?;
        Ok(())
    }
}
