// Build-Option Descriptor Models
// Typed representation of a build-options mapping: reserved include/exclude
// rule lists plus ordered root properties

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A partial job template from an `include` or `exclude` entry.
///
/// Maps property names to scalar values and may set `name` explicitly.
/// Include rules are allowed to reference keys outside the root-property
/// set; key order follows the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule(pub IndexMap<String, Value>);

impl Rule {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One or more rules.
///
/// Descriptor files may supply a single rule object where a list is
/// expected; both forms normalize to a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleList(pub Vec<Rule>);

impl RuleList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for RuleList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<Rule>),
            One(Rule),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(rules) => RuleList(rules),
            OneOrMany::One(rule) => RuleList(vec![rule]),
        })
    }
}

impl From<Vec<Rule>> for RuleList {
    fn from(rules: Vec<Rule>) -> Self {
        RuleList(rules)
    }
}

/// A parsed build-options descriptor.
///
/// Top-level keys are either the reserved `include`/`exclude` rule lists
/// or arbitrary properties, kept in declaration order. An array-valued
/// property is a root property and contributes one axis to the
/// combination cross-product; non-array extras are carried for round-trip
/// fidelity but take no part in generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default, skip_serializing_if = "RuleList::is_empty")]
    pub include: RuleList,

    #[serde(default, skip_serializing_if = "RuleList::is_empty")]
    pub exclude: RuleList,

    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
}

impl BuildOptions {
    /// Names of the array-valued properties, in declaration order.
    pub fn root_properties(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, value)| value.is_array())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Value domains of the root properties, in declaration order.
    pub fn domains(&self) -> IndexMap<String, Vec<Value>> {
        self.properties
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_array()
                    .map(|values| (name.clone(), values.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_list_accepts_single_object() {
        let options: BuildOptions = serde_json::from_value(json!({
            "os": ["ubuntu", "windows"],
            "exclude": { "os": "windows" }
        }))
        .unwrap();

        assert_eq!(options.exclude.len(), 1);
        assert_eq!(
            options.exclude.0[0].get("os"),
            Some(&json!("windows"))
        );
    }

    #[test]
    fn test_rule_list_accepts_array() {
        let options: BuildOptions = serde_json::from_value(json!({
            "include": [{ "os": "ubuntu" }, { "os": "windows" }]
        }))
        .unwrap();

        assert_eq!(options.include.len(), 2);
    }

    #[test]
    fn test_absent_rules_are_empty() {
        let options: BuildOptions = serde_json::from_value(json!({
            "os": ["ubuntu"]
        }))
        .unwrap();

        assert!(options.include.is_empty());
        assert!(options.exclude.is_empty());
    }

    #[test]
    fn test_root_properties_preserve_declaration_order() {
        let options: BuildOptions = serde_json::from_value(json!({
            "os": ["ubuntu"],
            "unity-version": ["2021", "2022"],
            "build-targets": ["StandaloneLinux64"]
        }))
        .unwrap();

        assert_eq!(
            options.root_properties(),
            vec!["os", "unity-version", "build-targets"]
        );
    }

    #[test]
    fn test_non_array_extras_are_not_root_properties() {
        let options: BuildOptions = serde_json::from_value(json!({
            "os": ["ubuntu"],
            "note": "kept but inert"
        }))
        .unwrap();

        assert_eq!(options.root_properties(), vec!["os"]);
        assert_eq!(options.properties.get("note"), Some(&json!("kept but inert")));
    }

    #[test]
    fn test_domains_match_declared_values() {
        let options: BuildOptions = serde_json::from_value(json!({
            "os": ["a", "b"],
            "arch": ["x64"]
        }))
        .unwrap();

        let domains = options.domains();
        assert_eq!(domains["os"], vec![json!("a"), json!("b")]);
        assert_eq!(domains["arch"], vec![json!("x64")]);
    }
}
