//! Rule-chain tracking
//!
//! The chain records which cascading rules were applied to reach a scan,
//! ordered root-first. Its wire form is a single comma-delimited annotation
//! so external tooling can reconstruct ancestry; internally it behaves as an
//! ordered set - a rule name never appears twice.

use crate::domain::{keys, Scan};

/// Ordered, duplicate-free history of applied rule names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanChain(Vec<String>);

impl ScanChain {
    /// Read the chain from a scan's annotation. An absent annotation is a
    /// valid, common state: root scans have an empty chain.
    pub fn of(scan: &Scan) -> Self {
        match scan.annotation(keys::CHAIN_ANNOTATION) {
            Some(raw) if !raw.is_empty() => Self(
                raw.split(keys::CHAIN_DELIMITER)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => Self::default(),
        }
    }

    pub fn contains(&self, rule_name: &str) -> bool {
        self.0.iter().any(|name| name == rule_name)
    }

    /// The chain a child scan carries: this chain plus `rule_name`.
    ///
    /// Appending a name already present is a no-op - the caller skips such
    /// rules, and the chain itself refuses to encode a duplicate.
    pub fn child(&self, rule_name: &str) -> Self {
        if self.contains(rule_name) {
            return self.clone();
        }
        let mut entries = self.0.clone();
        entries.push(rule_name.to_string());
        Self(entries)
    }

    /// Wire form for the chain annotation.
    pub fn encode(&self) -> String {
        self.0.join(&keys::CHAIN_DELIMITER.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Rule names, root-first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
