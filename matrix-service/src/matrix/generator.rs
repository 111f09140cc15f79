// Matrix Generation
// Expands a build-options descriptor into grouped, deduplicated CI jobs

use crate::matrix::combinations::cartesian_product;
use crate::matrix::grouping::{dedup_jobs, GroupBuckets};
use crate::matrix::job::{display_value, Job, JobGroup, JobMatrix, NAME_KEY};
use crate::matrix::naming::{combination_job_name, rule_job_name};
use crate::matrix::ordering::{sort_groups, SortOrder};
use crate::matrix::rules::{matches_exclusion, matching_includes, merge_rules};
use crate::matrix::sentinel::sentinel_includes;
use crate::options::models::{BuildOptions, Rule};

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Group name used when no root properties exist and no prefix is given.
const FALLBACK_GROUP_NAME: &str = "job";

/// Error type for matrix generation
#[derive(Debug, Clone)]
pub struct MatrixError {
    pub message: String,
    pub kind: MatrixErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixErrorKind {
    /// A candidate job resolved to no group value
    UnresolvedGroup,
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matrix error: {}", self.message)
    }
}

impl std::error::Error for MatrixError {}

impl MatrixError {
    pub fn unresolved_group(group_by: &str, job: &Job) -> Self {
        Self {
            message: format!(
                "Group '{}' is undefined for job: {}",
                group_by,
                job.to_json_string()
            ),
            kind: MatrixErrorKind::UnresolvedGroup,
        }
    }
}

/// Caller-supplied generation parameters.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Property to group jobs by; defaults to the first root property.
    pub group_by: Option<String>,
    /// Prefix prepended to every group name, separated by a space.
    pub name_prefix: Option<String>,
    /// Group ordering; absent means first-encounter order.
    pub sort: Option<SortOrder>,
}

impl GenerateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    /// The prefix, if it carries any non-whitespace content.
    fn prefix(&self) -> Option<&str> {
        self.name_prefix
            .as_deref()
            .filter(|prefix| !prefix.trim().is_empty())
    }
}

/// Expands a descriptor into the grouped job matrix.
///
/// Three modes, checked in order:
/// - include-only: no root properties; include rules become jobs directly
///   under a single synthetic group.
/// - grouped-include: every include rule fixes every non-group root
///   property (or it is a singleton); the group domain is crossed with the
///   include rules instead of the full combination path.
/// - general: full cartesian product with include overlays, exclude
///   filtering, group bucketing, and sentinel re-admission.
pub struct MatrixGenerator;

impl MatrixGenerator {
    pub fn generate(
        options: &BuildOptions,
        request: &GenerateRequest,
    ) -> Result<JobMatrix, MatrixError> {
        let root_properties = options.root_properties();
        let domains = options.domains();
        let include = options.include.as_slice();
        let exclude = options.exclude.as_slice();

        if root_properties.is_empty() {
            return Ok(Self::include_only(include, exclude, request));
        }

        let group_by = request
            .group_by
            .clone()
            .unwrap_or_else(|| root_properties[0].clone());

        if !include.is_empty()
            && Self::grouped_include_applies(include, &root_properties, &domains, &group_by)
        {
            return Ok(Self::grouped_include(
                include,
                exclude,
                &root_properties,
                &domains,
                &group_by,
                request,
            ));
        }

        Self::general(include, exclude, &root_properties, &domains, &group_by, request)
    }

    /// No root properties: every include rule is already a complete job.
    /// Rule-supplied names are kept as-is; none is synthesized.
    fn include_only(include: &[Rule], exclude: &[Rule], request: &GenerateRequest) -> JobMatrix {
        let jobs: Vec<Job> = include
            .iter()
            .map(|rule| Job::from_fields(rule.0.clone()))
            .filter(|job| !matches_exclusion(job, exclude))
            .collect();

        let name = request.prefix().unwrap_or(FALLBACK_GROUP_NAME).to_string();
        JobMatrix {
            jobs: vec![JobGroup::new(name, dedup_jobs(jobs))],
        }
    }

    /// True when every include rule fixes every root property other than
    /// the group key, or that property has exactly one possible value and
    /// is therefore inferable.
    fn grouped_include_applies(
        include: &[Rule],
        root_properties: &[String],
        domains: &IndexMap<String, Vec<Value>>,
        group_by: &str,
    ) -> bool {
        include.iter().all(|rule| {
            root_properties
                .iter()
                .filter(|property| property.as_str() != group_by)
                .all(|property| {
                    rule.contains_key(property)
                        || domains
                            .get(property.as_str())
                            .is_some_and(|values| values.len() == 1)
                })
        })
    }

    /// Cross every group value with every include rule. The include rules
    /// enumerate an orthogonal axis; running them through the combination
    /// path would multiply them into every combination instead.
    fn grouped_include(
        include: &[Rule],
        exclude: &[Rule],
        root_properties: &[String],
        domains: &IndexMap<String, Vec<Value>>,
        group_by: &str,
        request: &GenerateRequest,
    ) -> JobMatrix {
        let group_values = domains.get(group_by).cloned().unwrap_or_default();
        let mut groups = Vec::with_capacity(group_values.len());

        for group_value in &group_values {
            let mut jobs = Vec::with_capacity(include.len());

            for rule in include {
                let mut fields = rule.0.clone();
                fields.insert(group_by.to_string(), group_value.clone());

                // Fill still-missing singleton properties from their domain
                for property in root_properties {
                    if property.as_str() == group_by || fields.contains_key(property.as_str()) {
                        continue;
                    }
                    if let Some(values) = domains.get(property.as_str()) {
                        if let [value] = values.as_slice() {
                            fields.insert(property.clone(), value.clone());
                        }
                    }
                }

                let mut job = Job::from_fields(fields);
                if !matches_exclusion(&job, exclude) {
                    if !job.has_name() {
                        job.set_name(rule_job_name(&job.fields, group_by));
                    }
                    jobs.push(job);
                }
            }

            // A group value whose jobs were all excluded still yields a
            // (job-less) group entry
            groups.push((display_value(group_value), dedup_jobs(jobs)));
        }

        Self::assemble(groups, request)
    }

    /// Full combination path: overlay compatible include rules onto each
    /// combination, filter, bucket by group, then re-admit sentinel
    /// includes at the front of their buckets.
    fn general(
        include: &[Rule],
        exclude: &[Rule],
        root_properties: &[String],
        domains: &IndexMap<String, Vec<Value>>,
        group_by: &str,
        request: &GenerateRequest,
    ) -> Result<JobMatrix, MatrixError> {
        let mut buckets = GroupBuckets::new();

        for combination in cartesian_product(domains) {
            let overlay = merge_rules(&matching_includes(&combination, include));
            let default_name =
                combination_job_name(root_properties, domains, &combination, group_by, &overlay);

            // name leads; overlay values overwrite combination values in
            // place, new overlay keys append (an overlay name wins)
            let mut fields =
                IndexMap::with_capacity(combination.len() + overlay.len() + 1);
            fields.insert(NAME_KEY.to_string(), Value::String(default_name));
            for (key, value) in &combination {
                fields.insert(key.clone(), value.clone());
            }
            for (key, value) in &overlay {
                fields.insert(key.clone(), value.clone());
            }

            let job = Job::from_fields(fields);
            if matches_exclusion(&job, exclude) {
                continue;
            }

            let group = combination
                .get(group_by)
                .or_else(|| overlay.get(group_by))
                .map(display_value)
                .ok_or_else(|| MatrixError::unresolved_group(group_by, &job))?;

            buckets.push(&group, job);
        }

        for (group, rule) in sentinel_includes(include, root_properties, domains, group_by) {
            let mut job = Job::from_fields(rule.0.clone());
            if !job.has_name() {
                job.set_name(rule_job_name(&job.fields, group_by));
            }
            if matches_exclusion(&job, exclude) {
                continue;
            }
            buckets.push_front(&group, job);
        }

        let groups = buckets
            .into_groups()
            .map(|(group, jobs)| (group, dedup_jobs(jobs)))
            .collect();

        Ok(Self::assemble(groups, request))
    }

    /// Sort (when requested) by the underlying group value, then attach
    /// display names: `"<prefix> <group>"` or the bare group value.
    fn assemble(mut groups: Vec<(String, Vec<Job>)>, request: &GenerateRequest) -> JobMatrix {
        if let Some(order) = request.sort {
            sort_groups(&mut groups, order);
        }

        let prefix = request.prefix();
        let jobs = groups
            .into_iter()
            .map(|(group, jobs)| {
                let name = match prefix {
                    Some(prefix) => format!("{} {}", prefix, group),
                    None => group,
                };
                JobGroup::new(name, jobs)
            })
            .collect();

        JobMatrix { jobs }
    }
}
