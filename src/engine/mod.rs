//! The decision core
//!
//! Pure, synchronous computation: given a parent scan, its findings, and the
//! active cascading rules, decide which child scans to synthesize. No I/O
//! happens here - the async boundary lives in [`crate::hook`].

pub mod chain;
pub mod diagnostics;
pub mod inherit;
pub mod predicate;
pub mod reverse_match;
pub mod synthesize;
pub mod template;
mod value;

pub use chain::ScanChain;
pub use diagnostics::{Diagnostics, NoopDiagnostics, SkipReason, TracingDiagnostics};

use crate::domain::{CascadingRule, Finding, ParseDefinition, Scan};

/// Decide which cascading scans to start for a completed parent scan.
///
/// Deterministic and free of side effects apart from `diagnostics`: the
/// result is ordered rule-major (rules in input order), finding-minor
/// (findings in input order), and identical inputs always yield the
/// identical sequence.
///
/// A rule already present in the parent's chain is skipped, never an error -
/// this is the loop-prevention invariant: no rule is applied twice along one
/// ancestry path.
pub fn get_cascading_scans(
    parent: &Scan,
    findings: &[Finding],
    rules: &[CascadingRule],
    applied_rule: Option<&CascadingRule>,
    parse_definition: &ParseDefinition,
    diagnostics: &dyn Diagnostics,
) -> Vec<Scan> {
    let chain = ScanChain::of(parent);
    // Work on a copy with the rule that produced this scan stripped, so its
    // contribution is not templated into the children a second time. The
    // chain entry itself stays.
    let parent = purge_applied_rule(parent.clone(), applied_rule);

    let mut cascading_scans = Vec::new();
    for rule in rules {
        if chain.contains(rule.name()) {
            diagnostics.skipped(rule, None, SkipReason::AlreadyInChain);
            continue;
        }
        cascading_scans.extend(scans_matching_rule(
            &parent,
            findings,
            rule,
            parse_definition,
            diagnostics,
        ));
    }
    cascading_scans
}

/// One synthesized scan per finding that passes the selector gate and
/// matches at least one of the rule's predicates.
fn scans_matching_rule(
    parent: &Scan,
    findings: &[Finding],
    rule: &CascadingRule,
    parse_definition: &ParseDefinition,
    diagnostics: &dyn Diagnostics,
) -> Vec<Scan> {
    let cascades = parent.cascades();
    let selector = cascades.scan_annotation_selector.as_ref();
    let mappings = &parse_definition.spec.selector_attribute_mappings;

    let mut scans = Vec::new();
    for finding in findings {
        if !reverse_match::is_reverse_match(selector, &parent.metadata.annotations, finding, mappings)
        {
            diagnostics.skipped(rule, Some(finding), SkipReason::SelectorRejected);
            continue;
        }

        let matches = rule
            .spec
            .matches
            .any_of
            .iter()
            .any(|predicate| predicate::predicate_matches(finding, predicate));

        if matches {
            scans.push(synthesize::build_cascading_scan(parent, finding, rule));
        } else {
            diagnostics.skipped(rule, Some(finding), SkipReason::NoPredicateMatched);
        }
    }
    scans
}

/// Strip the applied rule's declared env/volumes/mounts/init containers from
/// the parent copy. Entries the rule contributed in templated form differ
/// from the raw declarations and survive the equality filter.
fn purge_applied_rule(mut parent: Scan, applied_rule: Option<&CascadingRule>) -> Scan {
    let Some(rule) = applied_rule else {
        return parent;
    };
    let scan_spec = &rule.spec.scan_spec;
    parent.spec.env.retain(|e| !scan_spec.env.contains(e));
    parent.spec.volumes.retain(|v| !scan_spec.volumes.contains(v));
    parent
        .spec
        .volume_mounts
        .retain(|m| !scan_spec.volume_mounts.contains(m));
    parent
        .spec
        .init_containers
        .retain(|c| !scan_spec.init_containers.contains(c));
    parent
}
