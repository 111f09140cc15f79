// Rule Matching and Merging
// Include-rule compatibility, overlay merging, and exclude evaluation

use crate::matrix::job::Job;
use crate::options::models::Rule;

use indexmap::IndexMap;
use serde_json::Value;

/// True when some exclude rule matches the job.
///
/// A rule matches when every one of its key/value pairs is present in the
/// job with an equal value (AND-of-equalities over a partial template).
/// An empty rule therefore matches every job; the engine keeps that
/// literal and leaves flagging it to descriptor validation.
pub fn matches_exclusion(job: &Job, exclude: &[Rule]) -> bool {
    exclude.iter().any(|rule| rule_matches(rule, &job.fields))
}

fn rule_matches(rule: &Rule, fields: &IndexMap<String, Value>) -> bool {
    rule.iter().all(|(key, value)| fields.get(key) == Some(value))
}

/// Include rules compatible with a combination: every rule key is either
/// absent from the combination or equal to the combination's value.
pub fn matching_includes<'a>(
    combination: &IndexMap<String, Value>,
    include: &'a [Rule],
) -> Vec<&'a Rule> {
    include
        .iter()
        .filter(|rule| {
            rule.iter().all(|(key, value)| match combination.get(key) {
                None => true,
                Some(existing) => existing == value,
            })
        })
        .collect()
}

/// Merge rules in declaration order into a single overlay.
///
/// Later rules overwrite earlier ones on key conflicts; a key keeps the
/// position of its first appearance.
pub fn merge_rules(rules: &[&Rule]) -> IndexMap<String, Value> {
    let mut merged = IndexMap::new();
    for rule in rules {
        for (key, value) in rule.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(value: serde_json::Value) -> Rule {
        serde_json::from_value(value).unwrap()
    }

    fn job(value: serde_json::Value) -> Job {
        serde_json::from_value(value).unwrap()
    }

    fn combination(value: serde_json::Value) -> IndexMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_exclusion_requires_every_key_to_match() {
        let exclude = vec![rule(json!({ "os": "b", "arch": "x64" }))];

        assert!(matches_exclusion(
            &job(json!({ "os": "b", "arch": "x64", "mode": "debug" })),
            &exclude
        ));
        assert!(!matches_exclusion(
            &job(json!({ "os": "b", "arch": "arm64" })),
            &exclude
        ));
        assert!(!matches_exclusion(&job(json!({ "os": "b" })), &exclude));
    }

    #[test]
    fn test_exclusion_may_match_on_name() {
        let exclude = vec![rule(json!({ "name": "nightly" }))];
        assert!(matches_exclusion(
            &job(json!({ "name": "nightly", "os": "a" })),
            &exclude
        ));
    }

    #[test]
    fn test_empty_exclude_rule_matches_everything() {
        let exclude = vec![rule(json!({}))];
        assert!(matches_exclusion(&job(json!({ "os": "a" })), &exclude));
    }

    #[test]
    fn test_no_exclude_rules_match_nothing() {
        assert!(!matches_exclusion(&job(json!({ "os": "a" })), &[]));
    }

    #[test]
    fn test_matching_includes_by_compatibility() {
        let include = vec![
            rule(json!({ "os": "ubuntu", "cache": "true" })),
            rule(json!({ "os": "windows", "cache": "false" })),
            rule(json!({ "extra": "always" })),
        ];
        let combo = combination(json!({ "os": "ubuntu" }));

        let matched = matching_includes(&combo, &include);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].get("cache"), Some(&json!("true")));
        assert_eq!(matched[1].get("extra"), Some(&json!("always")));
    }

    #[test]
    fn test_merge_later_rules_win() {
        let a = rule(json!({ "cache": "true", "toolchain": "stable" }));
        let b = rule(json!({ "cache": "false" }));

        let merged = merge_rules(&[&a, &b]);
        assert_eq!(merged["cache"], json!("false"));
        assert_eq!(merged["toolchain"], json!("stable"));
        // First appearance fixes the key position
        let keys: Vec<&String> = merged.keys().collect();
        assert_eq!(keys, vec!["cache", "toolchain"]);
    }
}
