//! Async boundary - collaborator traits and the cascade orchestrator
//!
//! The engine itself is pure; this module wires it to the outside world.
//! Findings, rules, and the scan-creation API are reached through traits so
//! the orchestration service, the CLI, and the tests can plug in their own
//! implementations.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{CascadingRule, Finding, ParseDefinition, Scan};
use crate::engine::{self, Diagnostics, TracingDiagnostics};

/// Yields the findings of the scan being processed.
#[async_trait]
pub trait FindingsSource: Send + Sync {
    /// All findings, already normalized. Called exactly once per pass.
    async fn findings(&self) -> Result<Vec<Finding>>;
}

/// Supplies policy resources for a decision pass.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// All currently active cascading rules, in evaluation order.
    async fn active_rules(&self, scan: &Scan) -> Result<Vec<CascadingRule>>;

    /// The rule that caused `scan` to exist; absent for root scans.
    async fn applied_rule(&self, scan: &Scan) -> Result<Option<CascadingRule>>;

    /// Selector attribute mappings applicable to the scan.
    async fn parse_definition(&self, scan: &Scan) -> Result<ParseDefinition>;
}

/// Accepts a fully-formed scan specification and creates it asynchronously.
#[async_trait]
pub trait ScanSink: Send + Sync {
    async fn submit(&self, scan: Scan) -> Result<()>;
}

#[async_trait]
impl<T: ScanSink + ?Sized> ScanSink for std::sync::Arc<T> {
    async fn submit(&self, scan: Scan) -> Result<()> {
        (**self).submit(scan).await
    }
}

/// The decision-pass entry point.
///
/// One `handle` call per completed scan: load inputs, run the pure engine,
/// submit each synthesized child. Submissions happen sequentially, one at a
/// time, in result order; the first rejection propagates and aborts the
/// remainder of the pass. Scans submitted before the failure stay created -
/// there is no rollback and no retry here.
pub struct CascadeHook<F, R, K> {
    findings: F,
    rules: R,
    sink: K,
    diagnostics: Box<dyn Diagnostics + Send + Sync>,
}

impl<F, R, K> CascadeHook<F, R, K>
where
    F: FindingsSource,
    R: RuleSource,
    K: ScanSink,
{
    pub fn new(findings: F, rules: R, sink: K) -> Self {
        Self {
            findings,
            rules,
            sink,
            diagnostics: Box::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + Send + Sync + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Run one decision pass for `scan`. Returns the number of scans
    /// submitted.
    pub async fn handle(&self, scan: &Scan) -> Result<usize> {
        let findings = self.findings.findings().await?;
        let rules = self.rules.active_rules(scan).await?;
        let applied_rule = self.rules.applied_rule(scan).await?;
        let parse_definition = self.rules.parse_definition(scan).await?;

        let cascading_scans = engine::get_cascading_scans(
            scan,
            &findings,
            &rules,
            applied_rule.as_ref(),
            &parse_definition,
            self.diagnostics.as_ref(),
        );

        let total = cascading_scans.len();
        for cascading_scan in cascading_scans {
            self.sink.submit(cascading_scan).await?;
        }
        Ok(total)
    }
}
