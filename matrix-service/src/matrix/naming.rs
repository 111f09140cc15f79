// Naming Policy
// Default display names for jobs that no rule named explicitly

use crate::matrix::job::{display_value, NAME_KEY};

use indexmap::IndexMap;
use serde_json::Value;

const INVALID_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// True when the value can appear in a synthesized name: a non-blank
/// string free of path-hostile characters.
fn usable_in_name(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            !s.trim().is_empty() && !s.contains(|c| INVALID_NAME_CHARS.contains(&c))
        }
        _ => false,
    }
}

/// Default name for a rule-built job (grouped-include and sentinel paths).
///
/// Takes the job's keys minus `name` and the group key, keeps only values
/// usable in a name, moves an `os` key to the front, and joins the values
/// with single spaces.
pub fn rule_job_name(fields: &IndexMap<String, Value>, group_by: &str) -> String {
    let mut keys: Vec<&str> = fields
        .iter()
        .filter(|(key, value)| {
            key.as_str() != NAME_KEY && key.as_str() != group_by && usable_in_name(value)
        })
        .map(|(key, _)| key.as_str())
        .collect();

    if let Some(pos) = keys.iter().position(|key| *key == "os") {
        let os = keys.remove(pos);
        keys.insert(0, os);
    }

    keys.iter()
        .map(|key| display_value(&fields[*key]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Default name for a combination-built job (general path).
///
/// Joins the combination's values for root properties that are not the
/// group key and have more than one possible value. When that name is
/// exactly the combination's `os` value and the include overlay
/// contributed keys, the overlay's values are used instead: the bare os
/// value alone cannot distinguish jobs that an overlay specialized.
pub fn combination_job_name(
    root_properties: &[String],
    domains: &IndexMap<String, Vec<Value>>,
    combination: &IndexMap<String, Value>,
    group_by: &str,
    overlay: &IndexMap<String, Value>,
) -> String {
    let name = root_properties
        .iter()
        .filter(|property| {
            property.as_str() != group_by
                && domains.get(property.as_str()).is_some_and(|values| values.len() > 1)
        })
        .filter_map(|property| combination.get(property).map(display_value))
        .collect::<Vec<_>>()
        .join(" ");

    let os_value = combination.get("os").and_then(Value::as_str);
    if os_value == Some(name.as_str()) && !overlay.is_empty() {
        return overlay
            .values()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(" ");
    }

    name
}
