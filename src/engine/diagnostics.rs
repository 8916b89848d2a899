//! Skip-decision diagnostics
//!
//! Matching silently drops candidates all the time (rule already applied,
//! selector rejected, no predicate hit) and none of that is an error. The
//! matcher records each drop through this interface instead of logging
//! inline, which keeps the algorithm pure and lets tests assert on the
//! decisions taken.

use crate::domain::{CascadingRule, Finding};

/// Why a candidate produced no scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The rule was already applied along this ancestry path.
    AlreadyInChain,
    /// The parent's annotation selector rejected the finding.
    SelectorRejected,
    /// The finding matched none of the rule's predicates.
    NoPredicateMatched,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::AlreadyInChain => "already_in_chain",
            SkipReason::SelectorRejected => "selector_rejected",
            SkipReason::NoPredicateMatched => "no_predicate_matched",
        }
    }
}

/// Records skip decisions made during matching.
///
/// `finding` is `None` when the whole rule was skipped before any finding
/// was considered (chain check).
pub trait Diagnostics {
    fn skipped(&self, rule: &CascadingRule, finding: Option<&Finding>, reason: SkipReason);
}

/// Logs skip decisions at debug level.
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn skipped(&self, rule: &CascadingRule, finding: Option<&Finding>, reason: SkipReason) {
        let finding_id = finding.map(|f| f.id.as_str());
        tracing::debug!(
            rule = rule.name(),
            finding = finding_id,
            reason = reason.as_str(),
            "cascading rule skipped"
        );
    }
}

/// Discards skip decisions; for callers that only want the result.
#[derive(Debug, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn skipped(&self, _rule: &CascadingRule, _finding: Option<&Finding>, _reason: SkipReason) {}
}
