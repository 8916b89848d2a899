//! Inheritance merging
//!
//! A child scan combines parent-scan fields with the (already templated)
//! rule's fields according to the parent's per-field inheritance flags:
//! maps shallow-merge with rule precedence, sequences concatenate parent
//! first, selectors intersect. With `inherit = false` the rule's value
//! stands alone.

use std::collections::BTreeMap;

use crate::domain::{
    CascadingRule, EnvVar, InitContainer, LabelSelector, Scan, Volume, VolumeMount,
};

/// Shallow merge: parent keys first, rule keys override on collision.
pub fn merge_inherited_map(
    parent: &BTreeMap<String, String>,
    rule: &BTreeMap<String, String>,
    inherit: bool,
) -> BTreeMap<String, String> {
    if !inherit {
        return rule.clone();
    }
    let mut merged = parent.clone();
    merged.extend(rule.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Concatenation: parent entries, then rule entries, neither reordered.
pub fn merge_inherited_array<T: Clone>(parent: &[T], rule: &[T], inherit: bool) -> Vec<T> {
    if inherit {
        parent.iter().chain(rule.iter()).cloned().collect()
    } else {
        rule.to_vec()
    }
}

/// Boolean intersection: both selectors' constraints must hold on the child.
pub fn merge_inherited_selector(
    parent: Option<&LabelSelector>,
    rule: Option<&LabelSelector>,
    inherit: bool,
) -> Option<LabelSelector> {
    if !inherit {
        return rule.cloned();
    }
    if parent.is_none() && rule.is_none() {
        return None;
    }
    let parent = parent.cloned().unwrap_or_default();
    let rule = rule.cloned().unwrap_or_default();
    Some(LabelSelector {
        match_labels: merge_inherited_map(&parent.match_labels, &rule.match_labels, true),
        match_expressions: merge_inherited_array(
            &parent.match_expressions,
            &rule.match_expressions,
            true,
        ),
    })
}

/// Field groups a child scan draws from its parent and the rule.
#[derive(Debug)]
pub struct MergedScanFields {
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub env: Vec<EnvVar>,
    pub volumes: Vec<Volume>,
    pub volume_mounts: Vec<VolumeMount>,
    pub init_containers: Vec<InitContainer>,
    pub hook_selector: Option<LabelSelector>,
}

/// Apply the parent's inheritance policy to every field group. Absent
/// rule-side values enter the merge as empty collections.
pub fn merge_rule_with_scan(parent: &Scan, rule: &CascadingRule) -> MergedScanFields {
    let cascades = parent.cascades();
    let scan_spec = &rule.spec.scan_spec;

    MergedScanFields {
        annotations: merge_inherited_map(
            &parent.metadata.annotations,
            &rule.spec.scan_annotations,
            cascades.inherit_annotations,
        ),
        labels: merge_inherited_map(
            &parent.metadata.labels,
            &rule.spec.scan_labels,
            cascades.inherit_labels,
        ),
        env: merge_inherited_array(&parent.spec.env, &scan_spec.env, cascades.inherit_env),
        volumes: merge_inherited_array(
            &parent.spec.volumes,
            &scan_spec.volumes,
            cascades.inherit_volumes,
        ),
        // Mounts ride on the volume inheritance flag; a mount without its
        // volume would be unusable anyway.
        volume_mounts: merge_inherited_array(
            &parent.spec.volume_mounts,
            &scan_spec.volume_mounts,
            cascades.inherit_volumes,
        ),
        init_containers: merge_inherited_array(
            &parent.spec.init_containers,
            &scan_spec.init_containers,
            cascades.inherit_init_containers,
        ),
        hook_selector: merge_inherited_selector(
            parent.spec.hook_selector.as_ref(),
            scan_spec.hook_selector.as_ref(),
            cascades.inherit_hook_selector,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LabelSelectorRequirement, SelectorOperator};

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_merge_rule_wins_on_collision() {
        let parent = map(&[("team", "security"), ("tier", "internal")]);
        let rule = map(&[("tier", "external")]);

        let merged = merge_inherited_map(&parent, &rule, true);
        assert_eq!(merged.get("team").unwrap(), "security");
        assert_eq!(merged.get("tier").unwrap(), "external");

        let replaced = merge_inherited_map(&parent, &rule, false);
        assert_eq!(replaced, rule);
    }

    #[test]
    fn test_array_merge_preserves_both_orders() {
        let parent = vec![
            EnvVar::literal("A", "1"),
            EnvVar::literal("B", "2"),
        ];
        let rule = vec![EnvVar::literal("C", "3")];

        let merged = merge_inherited_array(&parent, &rule, true);
        assert_eq!(merged.len(), parent.len() + rule.len());
        assert_eq!(merged[0].name, "A");
        assert_eq!(merged[1].name, "B");
        assert_eq!(merged[2].name, "C");

        let replaced = merge_inherited_array(&parent, &rule, false);
        assert_eq!(replaced, rule);
    }

    #[test]
    fn test_selector_intersection() {
        let parent = LabelSelector {
            match_labels: map(&[("hook", "persistence")]),
            match_expressions: vec![],
        };
        let rule = LabelSelector {
            match_labels: BTreeMap::new(),
            match_expressions: vec![LabelSelectorRequirement {
                key: "notifications".to_string(),
                operator: SelectorOperator::DoesNotExist,
                values: vec![],
            }],
        };

        let merged =
            merge_inherited_selector(Some(&parent), Some(&rule), true).expect("merged selector");
        assert_eq!(merged.match_labels.get("hook").unwrap(), "persistence");
        assert_eq!(merged.match_expressions.len(), 1);

        let replaced = merge_inherited_selector(Some(&parent), Some(&rule), false);
        assert_eq!(replaced.as_ref(), Some(&rule));

        assert_eq!(merge_inherited_selector(None, None, true), None);
    }

    #[test]
    fn test_absent_rule_values_merge_as_empty() {
        use crate::domain::{CascadeSpec, Matches, ScanTemplate};

        let parent = Scan::new("nmap-network", "nmap")
            .with_cascades(CascadeSpec::inherit_all())
            .with_env(EnvVar::literal("DEPTH", "full"));
        let rule = CascadingRule::new(
            "probe",
            Matches::default(),
            ScanTemplate {
                scan_type: "nikto".into(),
                ..ScanTemplate::default()
            },
        );

        let merged = merge_rule_with_scan(&parent, &rule);
        assert_eq!(merged.env, parent.spec.env);
        assert!(merged.volumes.is_empty());
        assert!(merged.hook_selector.is_none());
    }
}
