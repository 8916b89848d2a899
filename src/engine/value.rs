//! JSON value helpers shared by reverse matching and templating

use serde_json::Value;

/// Follow a dotted path (`attributes.hostname`) into a JSON value.
pub(crate) fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |value, segment| value.get(segment))
}

/// Stringify a scalar for comparison or rendering. Compound values and null
/// have no string form and resolve to nothing.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
