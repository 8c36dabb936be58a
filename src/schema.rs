//! Manifest schema types for the toolbox service.
//!
//! A manifest is the declarative description of the tools a toolbox service
//! exposes. This module deserializes a raw manifest body into typed schema
//! values and maps declared scalar type names onto the closed set of value
//! kinds the client can validate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_yaml::Value as YamlValue;
use std::collections::HashMap;

use crate::utils::error::{ToolboxError, ToolboxResult};

/// The closed set of scalar kinds a manifest parameter may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// UTF-8 text
    String,
    /// 64-bit signed integer
    Integer,
    /// Floating point number
    Number,
    /// Boolean
    Boolean,
    /// Untyped list
    Array,
}

impl ParameterType {
    /// Maps a declared scalar type name onto a [`ParameterType`].
    ///
    /// Fails with [`ToolboxError::UnsupportedType`] for any name outside the
    /// supported set.
    pub fn parse(name: &str) -> ToolboxResult<Self> {
        match name {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            other => Err(ToolboxError::UnsupportedType(other.to_string())),
        }
    }

    /// The manifest-facing name of this scalar kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }

    /// Checks whether a runtime JSON value conforms to this scalar kind.
    ///
    /// `Integer` accepts only integral numbers; `Number` accepts any JSON
    /// number.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Schema for a single tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// Declared scalar kind
    #[serde(rename = "type")]
    pub param_type: ParameterType,

    /// Human-readable description
    pub description: String,

    /// Acceptable authentication source names. Absent or empty means the
    /// parameter is supplied by the caller; non-empty means its value is
    /// injected from a registered credential and it never appears in the
    /// caller-facing input model.
    #[serde(rename = "authSources", skip_serializing_if = "Option::is_none")]
    pub auth_sources: Option<Vec<String>>,
}

impl ParameterSchema {
    /// Returns true when this parameter's value must come from a credential.
    pub fn requires_auth(&self) -> bool {
        self.auth_sources
            .as_ref()
            .map(|sources| !sources.is_empty())
            .unwrap_or(false)
    }
}

/// Schema for one named remote operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Human-readable description of the tool
    pub description: String,

    /// Ordered parameter list
    pub parameters: Vec<ParameterSchema>,
}

/// A parsed toolbox manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSchema {
    /// Version reported by the serving toolbox instance
    #[serde(rename = "serverVersion")]
    pub server_version: String,

    /// Tool schemas keyed by tool name
    pub tools: HashMap<String, ToolSchema>,
}

impl ManifestSchema {
    /// Parses a raw manifest body into a [`ManifestSchema`].
    ///
    /// The body is expected to be YAML (of which JSON is a subset). A body
    /// that is not well-formed structured data fails with
    /// [`ToolboxError::ManifestParse`]; a well-formed body with missing or
    /// mistyped required fields fails with
    /// [`ToolboxError::ManifestValidation`] carrying one message per
    /// offending field.
    pub fn parse(raw: &str) -> ToolboxResult<Self> {
        let doc: YamlValue = serde_yaml::from_str(raw)
            .map_err(|e| ToolboxError::ManifestParse(e.to_string()))?;

        let mut errors: Vec<String> = Vec::new();

        let root = match doc.as_mapping() {
            Some(root) => root,
            None => {
                return Err(ToolboxError::ManifestValidation(vec![
                    "manifest root must be a mapping".to_string(),
                ]))
            }
        };

        let server_version = match root.get("serverVersion").and_then(YamlValue::as_str) {
            Some(version) => version.to_string(),
            None => {
                errors.push("`serverVersion` is missing or not a string".to_string());
                String::new()
            }
        };

        let mut tools = HashMap::new();
        match root.get("tools").and_then(YamlValue::as_mapping) {
            Some(raw_tools) => {
                for (key, value) in raw_tools {
                    let Some(tool_name) = key.as_str() else {
                        errors.push("tool names must be strings".to_string());
                        continue;
                    };
                    match parse_tool(tool_name, value, &mut errors)? {
                        Some(tool) => {
                            tools.insert(tool_name.to_string(), tool);
                        }
                        None => continue,
                    }
                }
            }
            None => errors.push("`tools` is missing or not a mapping".to_string()),
        }

        if !errors.is_empty() {
            return Err(ToolboxError::ManifestValidation(errors));
        }

        Ok(Self {
            server_version,
            tools,
        })
    }
}

/// Parses one tool entry, accumulating field-level problems into `errors`.
///
/// Returns `Ok(None)` when the entry is malformed enough that no schema can
/// be built; an unsupported scalar type name aborts parsing immediately.
fn parse_tool(
    name: &str,
    value: &YamlValue,
    errors: &mut Vec<String>,
) -> ToolboxResult<Option<ToolSchema>> {
    let Some(entry) = value.as_mapping() else {
        errors.push(format!("tool `{}` must be a mapping", name));
        return Ok(None);
    };

    let before = errors.len();

    let description = match entry.get("description").and_then(YamlValue::as_str) {
        Some(description) => description.to_string(),
        None => {
            errors.push(format!(
                "tool `{}`: `description` is missing or not a string",
                name
            ));
            String::new()
        }
    };

    let mut parameters = Vec::new();
    match entry.get("parameters").and_then(YamlValue::as_sequence) {
        Some(raw_params) => {
            for (index, raw_param) in raw_params.iter().enumerate() {
                if let Some(param) = parse_parameter(name, index, raw_param, errors)? {
                    parameters.push(param);
                }
            }
        }
        None => errors.push(format!(
            "tool `{}`: `parameters` is missing or not a list",
            name
        )),
    }

    if errors.len() == before {
        Ok(Some(ToolSchema {
            description,
            parameters,
        }))
    } else {
        Ok(None)
    }
}

fn parse_parameter(
    tool: &str,
    index: usize,
    value: &YamlValue,
    errors: &mut Vec<String>,
) -> ToolboxResult<Option<ParameterSchema>> {
    let Some(entry) = value.as_mapping() else {
        errors.push(format!(
            "tool `{}`: parameter #{} must be a mapping",
            tool, index
        ));
        return Ok(None);
    };

    let before = errors.len();

    let name = match entry.get("name").and_then(YamlValue::as_str) {
        Some(name) => name.to_string(),
        None => {
            errors.push(format!(
                "tool `{}`: parameter #{}: `name` is missing or not a string",
                tool, index
            ));
            String::new()
        }
    };

    let param_type = match entry.get("type").and_then(YamlValue::as_str) {
        Some(type_name) => Some(ParameterType::parse(type_name)?),
        None => {
            errors.push(format!(
                "tool `{}`: parameter `{}`: `type` is missing or not a string",
                tool, name
            ));
            None
        }
    };

    let description = match entry.get("description").and_then(YamlValue::as_str) {
        Some(description) => description.to_string(),
        None => {
            errors.push(format!(
                "tool `{}`: parameter `{}`: `description` is missing or not a string",
                tool, name
            ));
            String::new()
        }
    };

    let auth_sources = match entry.get("authSources") {
        Some(raw_sources) => match parse_auth_sources(raw_sources) {
            Some(sources) => Some(sources),
            None => {
                errors.push(format!(
                    "tool `{}`: parameter `{}`: `authSources` must be a list of strings",
                    tool, name
                ));
                None
            }
        },
        None => None,
    };

    if errors.len() > before {
        return Ok(None);
    }

    // `param_type` is present whenever no error was recorded for it.
    let Some(param_type) = param_type else {
        return Ok(None);
    };

    Ok(Some(ParameterSchema {
        name,
        param_type,
        description,
        auth_sources,
    }))
}

fn parse_auth_sources(value: &YamlValue) -> Option<Vec<String>> {
    let sequence = value.as_sequence()?;
    sequence
        .iter()
        .map(|entry| entry.as_str().map(str::to_string))
        .collect()
}
