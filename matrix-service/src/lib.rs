// Matrix Service Library
// Core library for expanding build-option descriptors into CI job matrices

pub mod matrix;
pub mod options;

// Re-export descriptor types
pub use options::{BuildOptions, DescriptorError, DescriptorParser, Rule, RuleList};

// Re-export generation types
pub use matrix::{
    GenerateRequest, Job, JobGroup, JobMatrix, MatrixError, MatrixErrorKind, MatrixGenerator,
    MatrixInclude, SortOrder,
};
