// Matrix Generation Module
// Combination enumeration, rule evaluation, grouping, and assembly

pub mod combinations;
pub mod generator;
pub mod grouping;
pub mod job;
pub mod naming;
pub mod ordering;
pub mod rules;
pub mod sentinel;

pub use generator::{GenerateRequest, MatrixError, MatrixErrorKind, MatrixGenerator};
pub use job::{Job, JobGroup, JobMatrix, MatrixInclude};
pub use ordering::SortOrder;
