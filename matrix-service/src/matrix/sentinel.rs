// Sentinel Include Propagation
// Re-admits include rules whose out-of-domain values are consistently
// present across every group

use crate::matrix::job::display_value;
use crate::options::models::Rule;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Include rules eligible for re-admission, paired with their group value.
///
/// A root-property value referenced by an include rule but absent from
/// that property's declared domain is *external*. An external value is a
/// *sentinel* when, across all include rules, it is paired with every
/// group value in the grouping domain. Only rules whose external
/// references are all sentinels come back; a value paired with a strict
/// subset of groups marks its rules as one-offs that must not leak.
///
/// Rules with no external reference are not returned at all: the general
/// combination path already accounts for them.
pub fn sentinel_includes(
    include: &[Rule],
    root_properties: &[String],
    domains: &IndexMap<String, Vec<Value>>,
    group_by: &str,
) -> Vec<(String, Rule)> {
    let group_domain = group_domain(include, domains, group_by);
    if group_domain.is_empty() {
        return Vec::new();
    }

    // (property, value) -> group values it appears with
    let mut occurrences: IndexMap<(String, String), IndexSet<String>> = IndexMap::new();
    for rule in include {
        let Some(group_value) = rule.get(group_by) else {
            continue;
        };
        let group_value = display_value(group_value);
        for reference in external_references(rule, root_properties, domains) {
            occurrences.entry(reference).or_default().insert(group_value.clone());
        }
    }

    let sentinels: IndexSet<&(String, String)> = occurrences
        .iter()
        .filter(|(_, groups)| group_domain.iter().all(|value| groups.contains(value)))
        .map(|(reference, _)| reference)
        .collect();

    include
        .iter()
        .filter_map(|rule| {
            let group_value = display_value(rule.get(group_by)?);
            let references = external_references(rule, root_properties, domains);
            if references.is_empty() {
                return None;
            }
            if references.iter().any(|reference| !sentinels.contains(reference)) {
                return None;
            }
            Some((group_value, rule.clone()))
        })
        .collect()
}

/// The grouping domain: the group property's declared values, or, when it
/// declares none, the distinct group values include rules contribute, in
/// first-appearance order.
fn group_domain(
    include: &[Rule],
    domains: &IndexMap<String, Vec<Value>>,
    group_by: &str,
) -> IndexSet<String> {
    let declared = domains.get(group_by);
    if let Some(values) = declared {
        if !values.is_empty() {
            return values.iter().map(display_value).collect();
        }
    }
    include
        .iter()
        .filter_map(|rule| rule.get(group_by).map(display_value))
        .collect()
}

/// Root-property references in `rule` whose value lies outside the
/// property's declared domain.
fn external_references(
    rule: &Rule,
    root_properties: &[String],
    domains: &IndexMap<String, Vec<Value>>,
) -> Vec<(String, String)> {
    root_properties
        .iter()
        .filter_map(|property| {
            let value = rule.get(property)?;
            let known = domains.get(property.as_str());
            if known.is_some_and(|values| values.contains(value)) {
                return None;
            }
            Some((property.clone(), display_value(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(value: serde_json::Value) -> Vec<Rule> {
        serde_json::from_value(value).unwrap()
    }

    fn domains(value: serde_json::Value) -> IndexMap<String, Vec<Value>> {
        let map: IndexMap<String, Value> = serde_json::from_value(value).unwrap();
        map.into_iter()
            .map(|(k, v)| (k, v.as_array().unwrap().clone()))
            .collect()
    }

    fn roots(domains: &IndexMap<String, Vec<Value>>) -> Vec<String> {
        domains.keys().cloned().collect()
    }

    #[test]
    fn test_value_across_every_group_is_readmitted() {
        let doms = domains(json!({
            "os": ["ubuntu", "windows"],
            "unity-version": ["2021", "2022"]
        }));
        let include = rules(json!([
            { "os": "ubuntu", "unity-version": "6000.0" },
            { "os": "windows", "unity-version": "6000.0" }
        ]));

        let readmitted = sentinel_includes(&include, &roots(&doms), &doms, "os");
        assert_eq!(readmitted.len(), 2);
        assert_eq!(readmitted[0].0, "ubuntu");
        assert_eq!(readmitted[1].0, "windows");
    }

    #[test]
    fn test_subset_value_never_comes_back() {
        let doms = domains(json!({
            "os": ["ubuntu", "windows"],
            "unity-version": ["2021"]
        }));
        let include = rules(json!([
            { "os": "ubuntu", "unity-version": "4.7.2" }
        ]));

        let readmitted = sentinel_includes(&include, &roots(&doms), &doms, "os");
        assert!(readmitted.is_empty());
    }

    #[test]
    fn test_rule_mixing_sentinel_and_one_off_is_rejected() {
        let doms = domains(json!({
            "os": ["ubuntu", "windows"],
            "unity-version": ["2021"],
            "arch": ["x64"]
        }));
        let include = rules(json!([
            { "os": "ubuntu", "unity-version": "6000.0" },
            { "os": "windows", "unity-version": "6000.0", "arch": "riscv" }
        ]));

        let readmitted = sentinel_includes(&include, &roots(&doms), &doms, "os");
        // The windows rule also references the one-off arch "riscv"
        assert_eq!(readmitted.len(), 1);
        assert_eq!(readmitted[0].0, "ubuntu");
    }

    #[test]
    fn test_in_domain_rules_are_not_returned() {
        let doms = domains(json!({
            "os": ["ubuntu", "windows"],
            "unity-version": ["2021"]
        }));
        let include = rules(json!([
            { "os": "ubuntu", "unity-version": "2021" }
        ]));

        assert!(sentinel_includes(&include, &roots(&doms), &doms, "os").is_empty());
    }

    #[test]
    fn test_rules_without_group_value_are_skipped() {
        let doms = domains(json!({
            "os": ["ubuntu"],
            "unity-version": ["2021"]
        }));
        let include = rules(json!([
            { "unity-version": "6000.0" }
        ]));

        assert!(sentinel_includes(&include, &roots(&doms), &doms, "os").is_empty());
    }

    #[test]
    fn test_group_domain_falls_back_to_include_values() {
        // The group key is not a root property: the grouping domain comes
        // from the include rules themselves, and 6000.0 covers it.
        let doms = domains(json!({
            "unity-version": ["2021"]
        }));
        let include = rules(json!([
            { "os": "ubuntu", "unity-version": "6000.0" },
            { "os": "windows", "unity-version": "6000.0" }
        ]));

        let readmitted = sentinel_includes(&include, &roots(&doms), &doms, "os");
        assert_eq!(readmitted.len(), 2);
    }
}
