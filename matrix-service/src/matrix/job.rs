// Job and Matrix Output Models
// Generated jobs, their identity key, and the strategy-matrix output shape

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved job field holding the display name.
pub const NAME_KEY: &str = "name";

/// A single generated job: an ordered property map, one entry of which may
/// be `name`.
///
/// Field order is preserved for output; identity is order-independent (see
/// [`Job::canonical_key`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Job {
    pub fields: IndexMap<String, Value>,
}

impl Job {
    pub fn from_fields(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// True when the job carries a usable name: a non-empty string, or any
    /// other non-null scalar a rule may have supplied.
    pub fn has_name(&self) -> bool {
        match self.fields.get(NAME_KEY) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Set the display name. An existing `name` field keeps its position.
    pub fn set_name(&mut self, name: String) {
        self.fields.insert(NAME_KEY.to_string(), Value::String(name));
    }

    /// Order-independent identity over primitive-valued fields.
    ///
    /// Sorted `key:value` pairs restricted to strings, numbers, and
    /// booleans, pipe-joined. Arrays and nested mappings do not take part
    /// in identity.
    pub fn canonical_key(&self) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .filter_map(|(key, value)| {
                primitive_display(value).map(|rendered| format!("{}:{}", key, rendered))
            })
            .collect();
        parts.sort();
        parts.join("|")
    }

    /// Render the job as compact JSON for diagnostics.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_else(|_| format!("{:?}", self.fields))
    }
}

/// Render a primitive value the way it would appear in a job name or
/// identity key. Integral numbers render without a fractional part.
pub(crate) fn primitive_display(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                Some(n.to_string())
            }
        }
        _ => None,
    }
}

/// Render any value for display contexts, falling back to empty for null
/// and compact JSON for composites.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => primitive_display(other)
            .unwrap_or_else(|| serde_json::to_string(other).unwrap_or_default()),
    }
}

/// The `matrix` block of one output group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixInclude {
    pub include: Vec<Job>,
}

/// One named group carrying its deduplicated jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobGroup {
    pub name: String,
    pub matrix: MatrixInclude,
}

impl JobGroup {
    pub fn new(name: String, jobs: Vec<Job>) -> Self {
        Self {
            name,
            matrix: MatrixInclude { include: jobs },
        }
    }
}

/// The full generation result, serialized literally as
/// `{ "jobs": [ { "name": ..., "matrix": { "include": [...] } } ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMatrix {
    pub jobs: Vec<JobGroup>,
}

impl JobMatrix {
    /// Total job count across all groups.
    pub fn total_jobs(&self) -> usize {
        self.jobs.iter().map(|group| group.matrix.include.len()).sum()
    }
}
