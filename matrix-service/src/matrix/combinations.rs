// Combination Generator
// Cartesian product of the root-property value domains

use indexmap::IndexMap;
use serde_json::Value;

/// Every assignment of one value to each root property.
///
/// Combinations are ordered lexicographically by property declaration
/// order, each property's values in declared order; the first property
/// varies slowest. Zero properties yield the single empty combination, so
/// include-only descriptors still have a unit element to build on. A
/// property with an empty value array yields zero combinations.
pub fn cartesian_product(domains: &IndexMap<String, Vec<Value>>) -> Vec<IndexMap<String, Value>> {
    let mut combinations: Vec<IndexMap<String, Value>> = vec![IndexMap::new()];

    for (property, values) in domains {
        let mut expanded = Vec::with_capacity(combinations.len() * values.len());
        for prefix in &combinations {
            for value in values {
                let mut combination = prefix.clone();
                combination.insert(property.clone(), value.clone());
                expanded.push(combination);
            }
        }
        combinations = expanded;
    }

    combinations
}
