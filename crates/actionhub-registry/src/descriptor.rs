// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable metadata records for services and plugins.
//!
//! Form and documentation types are passed through to callers as-is; the
//! engine never interprets them.

use std::collections::BTreeMap;
use std::sync::Arc;

use actionhub_core::{PluginIdentity, RunnerFactory};
use actionhub_schema::ConfigSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Human documentation for one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDoc {
    pub desc: String,
}

impl PortDoc {
    pub fn new(desc: impl Into<String>) -> Self {
        Self { desc: desc.into() }
    }
}

/// Port documentation keyed by port name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    #[serde(default)]
    pub inputs: BTreeMap<String, PortDoc>,
    #[serde(default)]
    pub outputs: BTreeMap<String, PortDoc>,
}

/// UI-agnostic description of one configuration input widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormComponent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: serde_json::Map<String, Value>,
}

/// One configuration field in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Dotted path of the config value this field edits, e.g. `card.name`.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub component: FormComponent,
    #[serde(default)]
    pub required: bool,
}

/// A titled group of form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormGroup {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

/// Pre-built configuration form for a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub submit: Option<String>,
    pub groups: Vec<FormGroup>,
}

/// Implementation details of the remote environment that hosts a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSpec {
    pub module: String,
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    pub version: semver::Version,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Display metadata of a remote environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMetadata {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub group: Vec<String>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub documentation: Documentation,
}

/// How to reach the out-of-process environment executing a service's plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDescriptor {
    /// Whether the node starts a workflow.
    #[serde(default)]
    pub start: bool,
    pub spec: RemoteSpec,
    pub metadata: RemoteMetadata,
    /// Base URL of the microservice; `None` until one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Metadata and implementation reference for one plugin.
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Unique within the owning service.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Declared implementation identity, injected into the execution context.
    pub identity: PluginIdentity,
    /// Configuration schema; [`ConfigSchema::empty`] when nothing is configurable.
    pub schema: ConfigSchema,
    /// Creates a fresh runner per invocation.
    pub implementation: Arc<dyn RunnerFactory>,
    /// Default configuration returned to form consumers.
    pub init: Option<Value>,
    /// Optional configuration form, passed through unexamined.
    pub form: Option<Form>,
    /// Declared input port names.
    pub inputs: Vec<String>,
    /// Declared output port names.
    pub outputs: Vec<String>,
    /// Port documentation. Descriptive only.
    pub documentation: Documentation,
}

impl PluginDescriptor {
    /// Create a descriptor with an empty schema and no ports.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        identity: PluginIdentity,
        implementation: Arc<dyn RunnerFactory>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            identity,
            schema: ConfigSchema::empty(),
            implementation,
            init: None,
            form: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            documentation: Documentation::default(),
        }
    }

    pub fn with_schema(mut self, schema: ConfigSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_init(mut self, init: Value) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_ports<I, O>(mut self, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_documentation(mut self, documentation: Documentation) -> Self {
        self.documentation = documentation;
        self
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("schema", &self.schema)
            .field("init", &self.init)
            .field("form", &self.form.is_some())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// A service grouping: display name, optional remote environment, plugins by id.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub id: String,
    pub name: String,
    pub remote: Option<RemoteDescriptor>,
    pub plugins: BTreeMap<String, PluginDescriptor>,
}
