// Descriptor Parsing
// Entry points for turning raw JSON or YAML text into BuildOptions

use crate::options::models::BuildOptions;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading a build-options descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Invalid JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Descriptor root must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Parses build-options descriptors from their supported text formats.
pub struct DescriptorParser;

impl DescriptorParser {
    /// Parse a JSON descriptor.
    pub fn parse_json(input: &str) -> Result<BuildOptions, DescriptorError> {
        let value: Value = serde_json::from_str(input)?;
        Self::parse_value(value)
    }

    /// Parse a YAML descriptor.
    ///
    /// YAML is routed through the JSON value model so both formats share
    /// one descriptor shape (string keys, scalar values).
    pub fn parse_yaml(input: &str) -> Result<BuildOptions, DescriptorError> {
        let value: Value = serde_yaml::from_str(input)?;
        Self::parse_value(value)
    }

    /// Parse an already-deserialized JSON value.
    pub fn parse_value(value: Value) -> Result<BuildOptions, DescriptorError> {
        if !value.is_object() {
            return Err(DescriptorError::NotAMapping(json_type_name(&value)));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
