// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, validator, and execution engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::ActionHubError;

/// Context key under which plugin identity is injected.
pub const NODE_KEY: &str = "node";

/// Reserved key inside the `node` context carrying the implementation name.
pub const CLASS_NAME_KEY: &str = "className";

/// Reserved key inside the `node` context carrying the implementation module.
pub const MODULE_KEY: &str = "module";

/// Named runtime parameters passed to a plugin's run phase.
pub type Params = Map<String, Value>;

/// Stable error code attached to each [`FieldError`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    /// A required field is absent.
    Required,
    /// A value has the wrong JSON type.
    Type,
    /// A value is not one of the allowed options.
    Enum,
    /// A field is not declared by a strict schema.
    UnknownField,
    /// A numeric bound was violated.
    Range,
    /// A string, array, or object size bound was violated.
    Length,
    /// A string did not match the declared pattern.
    Pattern,
    /// A string did not match the declared format.
    Format,
    /// Any other structural constraint.
    #[serde(other)]
    Constraint,
}

/// A single schema violation, located by a dotted/bracketed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Locator into the payload, e.g. `address.city` or `items[2].sku`.
    /// Empty for errors about the payload root.
    pub path: String,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable error code.
    pub code: ErrorCode,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

/// Declared identity of a plugin implementation.
///
/// Copied into the execution context so a running instance can report which
/// implementation served it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginIdentity {
    /// Implementation type name, e.g. `TrelloCardAdder`.
    pub class_name: String,
    /// Defining module or namespace, e.g. `actionhub_engine::builtin::trello`.
    pub module: String,
}

impl PluginIdentity {
    pub fn new(class_name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            module: module.into(),
        }
    }
}

/// Payload that passed schema validation, with declared defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedConfig(Value);

impl ValidatedConfig {
    /// Wraps a value that has already been checked against its schema.
    ///
    /// Only validators should call this; runners receive instances from the engine.
    pub fn from_checked(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Deserializes the configuration into the plugin's typed config struct.
    ///
    /// A mismatch surfaces as a validation failure at the payload root, so
    /// callers see the same error shape as a schema rejection.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ActionHubError> {
        T::deserialize(&self.0).map_err(|e| {
            ActionHubError::invalid_field(FieldError::new("", e.to_string(), ErrorCode::Type))
        })
    }
}

/// Per-invocation request: caller context, configure-phase data, and run-phase params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Caller-supplied contextual data. Only allow-listed keys reach the plugin.
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Configuration data for the configure phase.
    #[serde(default = "empty_object")]
    pub init: Value,
    /// Named parameters for the run phase.
    #[serde(default)]
    pub params: Params,
}

impl Default for ExecutionRequest {
    fn default() -> Self {
        Self {
            context: Map::new(),
            init: empty_object(),
            params: Params::new(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// The restricted context surface visible to a plugin instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginContext(Map<String, Value>);

impl PluginContext {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self(entries)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The `node` substructure, if present.
    pub fn node(&self) -> Option<&Map<String, Value>> {
        self.0.get(NODE_KEY).and_then(Value::as_object)
    }

    /// Implementation name injected by the engine.
    pub fn class_name(&self) -> Option<&str> {
        self.node()
            .and_then(|n| n.get(CLASS_NAME_KEY))
            .and_then(Value::as_str)
    }

    /// Implementation module injected by the engine.
    pub fn module(&self) -> Option<&str> {
        self.node()
            .and_then(|n| n.get(MODULE_KEY))
            .and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}
