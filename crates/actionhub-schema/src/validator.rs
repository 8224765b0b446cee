// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema compilation and payload validation.

use actionhub_core::{ActionHubError, ValidatedConfig};
use schemars::{JsonSchema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString};
use tracing::debug;

use crate::defaults::{apply_defaults, forbid_unknown_fields};
use crate::normalize::normalize_errors;

/// What to do with payload keys a schema does not declare.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Reject undeclared keys unless the schema opts out with
    /// `"additionalProperties": true`.
    #[default]
    Reject,
    /// Leave schemas as written; undeclared keys pass unless forbidden.
    Allow,
}

/// A plugin's configuration schema (a JSON Schema document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSchema(Value);

impl ConfigSchema {
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// Schema for plugins that take no configuration: any object is accepted.
    pub fn empty() -> Self {
        Self(json!({ "type": "object" }))
    }

    /// Derive the schema from a typed configuration struct.
    pub fn for_type<T: JsonSchema>() -> Self {
        Self(SchemaGenerator::default().into_root_schema_for::<T>().to_value())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self::empty()
    }
}

/// A schema prepared under a policy and compiled into a validator.
pub struct CompiledSchema {
    schema: Value,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// The schema as prepared for validation (policy applied).
    pub fn prepared(&self) -> &Value {
        &self.schema
    }

    /// Validate a payload, returning it with defaults applied or the ordered
    /// field errors.
    pub fn validate(&self, payload: &Value) -> Result<ValidatedConfig, ActionHubError> {
        let mut candidate = payload.clone();
        apply_defaults(&self.schema, &self.schema, &mut candidate);

        let errors = normalize_errors(self.validator.iter_errors(&candidate), &candidate);
        if errors.is_empty() {
            Ok(ValidatedConfig::from_checked(candidate))
        } else {
            debug!(count = errors.len(), "configuration payload rejected");
            Err(ActionHubError::Validation(errors))
        }
    }
}

/// Validates untyped configuration payloads against plugin schemas.
///
/// Stateless apart from the policy: the same schema and payload always yield
/// the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    policy: UnknownFieldPolicy,
}

impl SchemaValidator {
    pub fn new(policy: UnknownFieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownFieldPolicy {
        self.policy
    }

    /// Prepare the schema under this validator's policy and compile it.
    pub fn compile(&self, schema: &ConfigSchema) -> Result<CompiledSchema, ActionHubError> {
        let mut prepared = schema.as_value().clone();
        if self.policy == UnknownFieldPolicy::Reject {
            forbid_unknown_fields(&mut prepared);
        }

        let validator = jsonschema::validator_for(&prepared)
            .map_err(|e| ActionHubError::Schema(e.to_string()))?;

        Ok(CompiledSchema {
            schema: prepared,
            validator,
        })
    }

    /// Compile `schema` and validate `payload` against it.
    pub fn validate(
        &self,
        schema: &ConfigSchema,
        payload: &Value,
    ) -> Result<ValidatedConfig, ActionHubError> {
        self.compile(schema)?.validate(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actionhub_core::{ErrorCode, FieldError};

    fn card_schema() -> ConfigSchema {
        ConfigSchema::new(json!({
            "type": "object",
            "properties": {
                "cardName": {"type": "string"},
                "position": {"type": "string", "enum": ["top", "bottom"], "default": "top"}
            },
            "required": ["cardName"]
        }))
    }

    #[test]
    fn missing_required_field_is_reported_at_its_path() {
        let err = SchemaValidator::default()
            .validate(&card_schema(), &json!({}))
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap(),
            &[FieldError::new("cardName", "field required", ErrorCode::Required)]
        );
    }

    #[test]
    fn valid_payload_gets_defaults_applied() {
        let config = SchemaValidator::default()
            .validate(&card_schema(), &json!({"cardName": "Buy milk"}))
            .unwrap();
        assert_eq!(
            config.as_value(),
            &json!({"cardName": "Buy milk", "position": "top"})
        );
    }

    #[test]
    fn unknown_fields_rejected_by_default() {
        let err = SchemaValidator::default()
            .validate(&card_schema(), &json!({"cardName": "x", "cardNmae": "y"}))
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path, "cardNmae");
        assert_eq!(fields[0].code, ErrorCode::UnknownField);
    }

    #[test]
    fn unknown_fields_pass_under_allow_policy() {
        let validator = SchemaValidator::new(UnknownFieldPolicy::Allow);
        let config = validator
            .validate(&card_schema(), &json!({"cardName": "x", "extra": 1}))
            .unwrap();
        assert_eq!(config.as_value()["extra"], 1);
    }

    #[test]
    fn permissive_schema_accepts_extra_fields_under_reject_policy() {
        let schema = ConfigSchema::new(json!({
            "type": "object",
            "additionalProperties": true,
            "properties": {"a": {"type": "string"}}
        }));
        assert!(SchemaValidator::default()
            .validate(&schema, &json!({"a": "x", "b": 2}))
            .is_ok());
    }

    #[test]
    fn any_of_branches_see_sibling_properties_under_reject_policy() {
        let schema = ConfigSchema::new(json!({
            "type": "object",
            "properties": {"kind": {"type": "string"}},
            "anyOf": [
                {"properties": {"a": {"type": "integer"}}, "required": ["a"]},
                {"properties": {"b": {"type": "integer"}}, "required": ["b"]}
            ]
        }));
        let validator = SchemaValidator::default();
        assert!(validator.validate(&schema, &json!({"kind": "x", "a": 1})).is_ok());

        let err = validator
            .validate(&schema, &json!({"kind": "x", "a": 1, "c": 2}))
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap(),
            &[FieldError::new("c", "extra fields not permitted", ErrorCode::UnknownField)]
        );
    }

    #[test]
    fn ref_target_properties_combine_with_siblings_under_reject_policy() {
        let schema = ConfigSchema::new(json!({
            "$defs": {"Base": {"type": "object", "properties": {"name": {"type": "string"}}}},
            "$ref": "#/$defs/Base",
            "properties": {"extra": {"type": "integer"}}
        }));
        let validator = SchemaValidator::default();
        assert!(validator.validate(&schema, &json!({"name": "n", "extra": 1})).is_ok());

        let err = validator
            .validate(&schema, &json!({"name": "n", "extra": 1, "bogus": true}))
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path, "bogus");
        assert_eq!(fields[0].code, ErrorCode::UnknownField);
    }

    #[test]
    fn referenced_nested_object_rejects_unknown_fields() {
        let schema = ConfigSchema::new(json!({
            "type": "object",
            "properties": {"card": {"$ref": "#/$defs/Card"}},
            "$defs": {"Card": {"type": "object", "properties": {"name": {"type": "string"}}}}
        }));
        let err = SchemaValidator::default()
            .validate(&schema, &json!({"card": {"name": "n", "nmae": "m"}}))
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path, "card.nmae");
        assert_eq!(fields[0].code, ErrorCode::UnknownField);
    }

    #[test]
    fn empty_schema_accepts_any_object() {
        let config = SchemaValidator::default()
            .validate(&ConfigSchema::empty(), &json!({"anything": [1, 2]}))
            .unwrap();
        assert_eq!(config.as_value()["anything"], json!([1, 2]));
    }

    #[test]
    fn non_object_payload_is_a_root_type_error() {
        let err = SchemaValidator::default()
            .validate(&card_schema(), &json!("oops"))
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields[0].path, "");
        assert_eq!(fields[0].code, ErrorCode::Type);
    }

    #[test]
    fn nested_and_indexed_errors_use_bracketed_paths() {
        let schema = ConfigSchema::new(json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"sku": {"type": "string", "minLength": 3}},
                        "required": ["sku"]
                    }
                }
            }
        }));
        let payload = json!({"items": [{"sku": "abc"}, {}, {"sku": "x"}]});
        let err = SchemaValidator::default().validate(&schema, &payload).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields[0].path, "items[1].sku");
        assert_eq!(fields[0].code, ErrorCode::Required);
        assert_eq!(fields[1].path, "items[2].sku");
        assert_eq!(fields[1].code, ErrorCode::Length);
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let schema = ConfigSchema::new(json!({"type": 12}));
        let err = SchemaValidator::default().compile(&schema).unwrap_err();
        assert!(matches!(err, ActionHubError::Schema(_)));
    }

    #[derive(schemars::JsonSchema, serde::Deserialize)]
    #[allow(dead_code)]
    struct Typed {
        name: String,
        #[serde(default = "default_limit")]
        limit: u32,
    }

    fn default_limit() -> u32 {
        10
    }

    #[test]
    fn derived_schema_validates_and_parses() {
        let schema = ConfigSchema::for_type::<Typed>();
        let validator = SchemaValidator::default();

        let err = validator.validate(&schema, &json!({"limit": 2})).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].path, "name");

        let config = validator.validate(&schema, &json!({"name": "n"})).unwrap();
        let typed: Typed = config.parse().unwrap();
        assert_eq!(typed.limit, 10);
    }
}
