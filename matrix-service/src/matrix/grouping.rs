// Grouping and Deduplication
// Ordered per-group job buckets and first-wins identity dedup

use crate::matrix::job::Job;

use indexmap::IndexMap;
use std::collections::HashSet;

/// Ordered job buckets keyed by group value.
///
/// Groups appear in first-encounter order; jobs within a group in the
/// order the rule engine produced them, except that sentinel entries are
/// pushed to the front of their group.
#[derive(Debug, Default)]
pub struct GroupBuckets {
    buckets: IndexMap<String, Vec<Job>>,
}

impl GroupBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job to its group, creating the group on first use.
    pub fn push(&mut self, group: &str, job: Job) {
        self.buckets.entry(group.to_string()).or_default().push(job);
    }

    /// Insert a job at the front of its group, creating the group on
    /// first use. Sentinel include entries lead their group so they stay
    /// visually distinct from generated combinations.
    pub fn push_front(&mut self, group: &str, job: Job) {
        self.buckets
            .entry(group.to_string())
            .or_default()
            .insert(0, job);
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Consume the buckets in group first-encounter order.
    pub fn into_groups(self) -> impl Iterator<Item = (String, Vec<Job>)> {
        self.buckets.into_iter()
    }
}

/// Drop structurally duplicate jobs, keeping the first occurrence.
///
/// Identity is [`Job::canonical_key`]; later duplicates vanish silently.
pub fn dedup_jobs(jobs: Vec<Job>) -> Vec<Job> {
    let mut seen = HashSet::with_capacity(jobs.len());
    let mut unique = Vec::with_capacity(jobs.len());
    for job in jobs {
        if seen.insert(job.canonical_key()) {
            unique.push(job);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: serde_json::Value) -> Job {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_groups_keep_first_encounter_order() {
        let mut buckets = GroupBuckets::new();
        buckets.push("windows", job(json!({ "os": "windows" })));
        buckets.push("ubuntu", job(json!({ "os": "ubuntu" })));
        buckets.push("windows", job(json!({ "os": "windows", "arch": "x64" })));

        let order: Vec<String> = buckets.into_groups().map(|(group, _)| group).collect();
        assert_eq!(order, vec!["windows", "ubuntu"]);
    }

    #[test]
    fn test_push_front_leads_the_group() {
        let mut buckets = GroupBuckets::new();
        buckets.push("g", job(json!({ "kind": "generated" })));
        buckets.push_front("g", job(json!({ "kind": "sentinel" })));

        let (_, jobs) = buckets.into_groups().next().unwrap();
        assert_eq!(jobs[0].get("kind"), Some(&json!("sentinel")));
        assert_eq!(jobs[1].get("kind"), Some(&json!("generated")));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let jobs = vec![
            job(json!({ "os": "a", "tag": ["first"] })),
            job(json!({ "os": "b" })),
            job(json!({ "tag": ["second"], "os": "a" })),
        ];

        let unique = dedup_jobs(jobs);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].get("tag"), Some(&json!(["first"])));
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let jobs = vec![
            job(json!({ "os": "a" })),
            job(json!({ "os": "a" })),
            job(json!({ "os": "b" })),
        ];

        let once = dedup_jobs(jobs);
        let twice = dedup_jobs(once.clone());
        assert_eq!(once, twice);
    }
}
