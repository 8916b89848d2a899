//! Template rendering for matched rules
//!
//! Rule scan specs may embed `{{dotted.path}}` placeholders resolved against
//! a context built from the matched finding overlaid on the parent scan
//! (finding fields win on collision), plus the computed `$.hostOrIP`
//! shortcut. Unresolved placeholders render as empty strings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::{CascadingRule, Finding, Scan};

use super::value::{lookup_path, scalar_to_string};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder pattern is valid"));

/// Rendering context for one (parent scan, finding) pair.
pub(crate) struct TemplateContext {
    root: Value,
}

impl TemplateContext {
    pub fn new(parent: &Scan, finding: &Finding) -> Self {
        let mut root = serde_json::to_value(parent).unwrap_or(Value::Null);
        let overlay = serde_json::to_value(finding).unwrap_or(Value::Null);
        if let (Value::Object(base), Value::Object(fields)) = (&mut root, overlay) {
            for (key, value) in fields {
                base.insert(key, value);
            }
        }

        // "$" holds computed helper attributes.
        let host_or_ip = ["hostname", "ip_address"]
            .iter()
            .find_map(|key| finding.attribute(key).and_then(scalar_to_string))
            .filter(|value| !value.is_empty())
            .unwrap_or_default();
        if let Value::Object(base) = &mut root {
            base.insert("$".to_string(), serde_json::json!({ "hostOrIP": host_or_ip }));
        }

        Self { root }
    }

    /// Render every `{{dotted.path}}` placeholder in `template`.
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures| {
                lookup_path(&self.root, &caps[1])
                    .and_then(scalar_to_string)
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// Render every template embedded in `rule` against (parent, finding).
///
/// Returns a new rule; the caller's rule is never mutated, so one shared
/// rule can be rendered against many findings in the same pass. Env values
/// sourced from external references (`valueFrom`) pass through untouched -
/// only literal values are templated.
pub fn template_rule(parent: &Scan, finding: &Finding, rule: &CascadingRule) -> CascadingRule {
    let context = TemplateContext::new(parent, finding);
    let mut rendered = rule.clone();

    let scan_spec = &mut rendered.spec.scan_spec;
    scan_spec.scan_type = context.render(&scan_spec.scan_type);
    for parameter in &mut scan_spec.parameters {
        *parameter = context.render(parameter);
    }
    for env in &mut scan_spec.env {
        if let Some(value) = &env.value {
            env.value = Some(context.render(value));
        }
    }
    for container in &mut scan_spec.init_containers {
        for argument in &mut container.command {
            *argument = context.render(argument);
        }
        for env in &mut container.env {
            if let Some(value) = &env.value {
                env.value = Some(context.render(value));
            }
        }
    }

    for value in rendered.spec.scan_annotations.values_mut() {
        *value = context.render(value);
    }
    for value in rendered.spec.scan_labels.values_mut() {
        *value = context.render(value);
    }

    rendered
}
