//! Child-scan assembly
//!
//! Once a (rule, finding) pair has matched, this module produces the final
//! scan specification: generated name, bookkeeping annotations, an owner
//! reference back to the parent, and the merged/templated spec.

use crate::domain::{keys, CascadingRule, Finding, ObjectMeta, OwnerReference, Scan, ScanSpec};

use super::chain::ScanChain;
use super::inherit::merge_rule_with_scan;
use super::template::template_rule;

/// Name prefix for a child scan.
///
/// If the parent's name starts with its own scan type, that prefix is
/// swapped for the child's scan type - otherwise `nmap-network` would
/// cascade into `nmap-network-nikto-…` and the name would no longer say
/// which tool actually runs. The rule name is appended as generation suffix;
/// the unique trailing id is assigned by the resource creator.
pub fn generate_cascading_scan_name(parent: &Scan, rule: &CascadingRule) -> String {
    let mut prefix = parent.name().to_string();
    if !parent.spec.scan_type.is_empty() && prefix.starts_with(&parent.spec.scan_type) {
        prefix = prefix.replacen(&parent.spec.scan_type, &rule.spec.scan_spec.scan_type, 1);
    }
    format!("{}-{}", prefix, rule.name())
}

/// Assemble the child scan for one matched (rule, finding) pair.
pub fn build_cascading_scan(parent: &Scan, finding: &Finding, rule: &CascadingRule) -> Scan {
    // Render the shared rule against this finding; the original stays
    // pristine for the remaining findings of the pass.
    let rule = template_rule(parent, finding, rule);
    let merged = merge_rule_with_scan(parent, &rule);
    let chain = ScanChain::of(parent).child(rule.name());

    let mut annotations = merged.annotations;
    annotations.insert(keys::HOOK_ANNOTATION.to_string(), keys::HOOK_NAME.to_string());
    annotations.insert(
        keys::PARENT_SCAN_ANNOTATION.to_string(),
        parent.name().to_string(),
    );
    annotations.insert(
        keys::MATCHED_FINDING_ANNOTATION.to_string(),
        finding.id.clone(),
    );
    annotations.insert(keys::CHAIN_ANNOTATION.to_string(), chain.encode());

    Scan {
        api_version: keys::SCAN_API_VERSION.to_string(),
        kind: keys::SCAN_KIND.to_string(),
        metadata: ObjectMeta {
            name: None,
            generate_name: Some(format!("{}-", generate_cascading_scan_name(parent, &rule))),
            uid: None,
            labels: merged.labels,
            annotations,
            owner_references: vec![OwnerReference {
                api_version: keys::SCAN_API_VERSION.to_string(),
                kind: keys::SCAN_KIND.to_string(),
                name: parent.name().to_string(),
                uid: parent.metadata.uid.clone(),
                block_owner_deletion: true,
                controller: true,
            }],
        },
        spec: ScanSpec {
            scan_type: rule.spec.scan_spec.scan_type.clone(),
            parameters: rule.spec.scan_spec.parameters.clone(),
            // Children apply the same inheritance policy to grandchildren.
            cascades: parent.spec.cascades.clone(),
            env: merged.env,
            volumes: merged.volumes,
            volume_mounts: merged.volume_mounts,
            init_containers: merged.init_containers,
            hook_selector: merged.hook_selector,
        },
    }
}
