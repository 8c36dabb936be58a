//! Dynamic input models built from manifest parameter lists.
//!
//! The manifest is only known at runtime, so the caller-facing argument
//! record is represented as an ordered field list validated by iteration
//! rather than a compile-time struct.

use serde_json::{Map, Value};

use crate::schema::{ParameterSchema, ParameterType};
use crate::utils::error::{ToolboxError, ToolboxResult};

/// One field of a tool's caller-facing argument record.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Expected scalar kind
    pub param_type: ParameterType,
    /// Human-readable description from the manifest
    pub description: String,
}

/// The caller-facing argument record of one tool, derived from its plain
/// (non-authenticated) parameters.
///
/// The manifest carries no required/optional marker per parameter, so every
/// field is treated as optional and a missing or `null` value is replaced by
/// an empty string before validation and transmission. This mirrors the
/// behavior the service currently expects.
#[derive(Debug, Clone)]
pub struct InputModel {
    tool: String,
    fields: Vec<FieldSpec>,
}

impl InputModel {
    /// Builds the input model for `tool` from an already-filtered list of
    /// plain parameters, preserving their manifest order.
    pub fn new(tool: &str, parameters: &[ParameterSchema]) -> Self {
        let fields = parameters
            .iter()
            .map(|param| FieldSpec {
                name: param.name.clone(),
                param_type: param.param_type,
                description: param.description.clone(),
            })
            .collect();

        Self {
            tool: tool.to_string(),
            fields,
        }
    }

    /// The tool this model belongs to.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The ordered field list.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns true when `name` is a declared field of this model.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Validates `args` against the model and returns the normalized body
    /// map ready for transmission.
    ///
    /// Declared fields that are absent or `null` become `""`; declared fields
    /// whose runtime type does not match contribute one message each to a
    /// [`ToolboxError::Validation`]. Keys the model does not declare are
    /// dropped from the result: only declared parameters make it onto the
    /// wire through validation.
    pub fn validate(&self, args: &Map<String, Value>) -> ToolboxResult<Map<String, Value>> {
        let mut body = Map::new();
        let mut errors: Vec<String> = Vec::new();

        for field in &self.fields {
            let value = match args.get(&field.name) {
                None | Some(Value::Null) => Value::String(String::new()),
                Some(value) => value.clone(),
            };

            // The empty-string sentinel stands in for "no value" on fields
            // of every kind, so it bypasses the type check.
            if !matches!(value, Value::String(ref s) if s.is_empty())
                && !field.param_type.matches(&value)
            {
                errors.push(format!(
                    "`{}` must be of type {}",
                    field.name, field.param_type
                ));
                continue;
            }

            body.insert(field.name.clone(), value);
        }

        if !errors.is_empty() {
            return Err(ToolboxError::Validation(errors));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> InputModel {
        InputModel::new(
            "test_tool",
            &[
                ParameterSchema {
                    name: "param1".to_string(),
                    param_type: ParameterType::String,
                    description: "Param 1".to_string(),
                    auth_sources: None,
                },
                ParameterSchema {
                    name: "param2".to_string(),
                    param_type: ParameterType::Integer,
                    description: "Param 2".to_string(),
                    auth_sources: None,
                },
            ],
        )
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_validate_accepts_matching_types() {
        let body = model()
            .validate(&args(json!({"param1": "hello", "param2": 123})))
            .unwrap();
        assert_eq!(body["param1"], json!("hello"));
        assert_eq!(body["param2"], json!(123));
    }

    #[test]
    fn test_validate_rejects_each_bad_field() {
        let result = model().validate(&args(json!({"param1": 123, "param2": "nope"})));
        let Err(ToolboxError::Validation(errors)) = result else {
            panic!("expected validation failure, got {:?}", result);
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("param1"));
        assert!(errors[1].contains("param2"));
    }

    #[test]
    fn test_validate_substitutes_missing_with_empty_string() {
        let body = model().validate(&Map::new()).unwrap();
        assert_eq!(body["param1"], json!(""));
        assert_eq!(body["param2"], json!(""));
    }

    #[test]
    fn test_validate_substitutes_null_with_empty_string() {
        let body = model()
            .validate(&args(json!({"param1": null, "param2": 5})))
            .unwrap();
        assert_eq!(body["param1"], json!(""));
        assert_eq!(body["param2"], json!(5));
    }

    #[test]
    fn test_validate_drops_undeclared_keys() {
        let body = model()
            .validate(&args(json!({"param2": 5, "extra": true})))
            .unwrap();
        assert_eq!(body["param2"], json!(5));
        assert!(body.get("extra").is_none());
    }

    #[test]
    fn test_field_order_preserved() {
        let model = model();
        let names: Vec<_> = model.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["param1", "param2"]);
    }
}
