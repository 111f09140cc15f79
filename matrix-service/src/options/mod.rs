// Build-Option Descriptor Module
// Typed descriptor model and JSON/YAML parsing

pub mod models;
pub mod parse;

pub use models::{BuildOptions, Rule, RuleList};
pub use parse::{DescriptorError, DescriptorParser};
