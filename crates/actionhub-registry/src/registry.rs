// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable registry of services and their plugins.
//!
//! A [`Registry`] is assembled once through [`RegistryBuilder`] and never
//! mutated afterwards. Catalog lookups degrade to `None`/empty results for
//! unknown ids; [`Registry::plugin_schema`] is the one lookup that fails,
//! because validation cannot proceed without a schema.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use actionhub_core::{ActionHubError, RunnerFactory};
use actionhub_schema::{ConfigSchema, SchemaValidator};
use serde_json::Value;
use tracing::{debug, info};

use crate::descriptor::{Form, PluginDescriptor, RemoteDescriptor, ServiceDescriptor};

/// A service definition staged for registration.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub id: String,
    pub name: String,
    pub remote: Option<RemoteDescriptor>,
    pub plugins: Vec<PluginDescriptor>,
}

impl ServiceSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            remote: None,
            plugins: Vec::new(),
        }
    }

    pub fn with_remote(mut self, remote: RemoteDescriptor) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_plugin(mut self, plugin: PluginDescriptor) -> Self {
        self.plugins.push(plugin);
        self
    }
}

/// Collects service definitions and checks them before producing a [`Registry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    validator: SchemaValidator,
    services: Vec<ServiceSpec>,
}

impl RegistryBuilder {
    /// Create a builder whose registry validates with `validator`.
    pub fn new(validator: SchemaValidator) -> Self {
        Self {
            validator,
            services: Vec::new(),
        }
    }

    /// Stage a service for registration.
    pub fn register(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }

    /// Stage every service yielded by `services`.
    pub fn register_all(mut self, services: impl IntoIterator<Item = ServiceSpec>) -> Self {
        self.services.extend(services);
        self
    }

    /// Check every staged definition and build the registry.
    ///
    /// Collects all problems before failing: duplicate service ids, duplicate
    /// plugin ids within a service, schemas that do not compile, and `init`
    /// data that does not satisfy its own schema.
    pub fn build(self) -> Result<Registry, ActionHubError> {
        let mut problems = Vec::new();
        let mut services = BTreeMap::new();

        for spec in self.services {
            if services.contains_key(&spec.id) {
                problems.push(format!("duplicate service id `{}`", spec.id));
                continue;
            }

            let mut seen = HashSet::new();
            let mut plugins = BTreeMap::new();
            for plugin in spec.plugins {
                if !seen.insert(plugin.id.clone()) {
                    problems.push(format!(
                        "duplicate plugin id `{}` in service `{}`",
                        plugin.id, spec.id
                    ));
                    continue;
                }
                if let Err(problem) = check_plugin(&self.validator, &plugin) {
                    problems.push(format!("service `{}`: {problem}", spec.id));
                    continue;
                }
                plugins.insert(plugin.id.clone(), plugin);
            }

            debug!(service_id = %spec.id, plugins = plugins.len(), "service registered");
            services.insert(
                spec.id.clone(),
                ServiceDescriptor {
                    id: spec.id,
                    name: spec.name,
                    remote: spec.remote,
                    plugins,
                },
            );
        }

        if !problems.is_empty() {
            return Err(ActionHubError::Registry(problems.join("; ")));
        }

        let registry = Registry {
            services,
            validator: self.validator,
        };
        info!(services = registry.len(), "registry built");
        Ok(registry)
    }
}

fn check_plugin(validator: &SchemaValidator, plugin: &PluginDescriptor) -> Result<(), String> {
    let compiled = validator
        .compile(&plugin.schema)
        .map_err(|e| format!("plugin `{}`: {e}", plugin.id))?;

    if let Some(init) = &plugin.init {
        if let Err(err) = compiled.validate(init) {
            let detail = err
                .field_errors()
                .map(|fields| {
                    fields
                        .iter()
                        .map(|f| format!("{} ({})", f.path, f.code))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_else(|| err.to_string());
            return Err(format!(
                "plugin `{}`: init data violates its schema: {detail}",
                plugin.id
            ));
        }
    }
    Ok(())
}

/// Read-only catalog snapshot: service id -> service descriptor.
///
/// Iteration is ordered by id, so listings are stable within a snapshot.
#[derive(Debug)]
pub struct Registry {
    services: BTreeMap<String, ServiceDescriptor>,
    validator: SchemaValidator,
}

impl Registry {
    /// Start building a registry that validates with `validator`.
    pub fn builder(validator: SchemaValidator) -> RegistryBuilder {
        RegistryBuilder::new(validator)
    }

    /// A registry with no services.
    pub fn empty() -> Self {
        Self {
            services: BTreeMap::new(),
            validator: SchemaValidator::default(),
        }
    }

    /// The validator (and unknown-field policy) this registry was checked with.
    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// `(id, name)` pairs for all services.
    pub fn list_services(&self) -> Vec<(&str, &str)> {
        self.services
            .values()
            .map(|s| (s.id.as_str(), s.name.as_str()))
            .collect()
    }

    /// `(id, name)` pairs for the plugins of a service; empty if unknown.
    pub fn list_plugins(&self, service_id: &str) -> Vec<(&str, &str)> {
        self.services
            .get(service_id)
            .map(|s| {
                s.plugins
                    .values()
                    .map(|p| (p.id.as_str(), p.name.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn service(&self, service_id: &str) -> Option<&ServiceDescriptor> {
        self.services.get(service_id)
    }

    pub fn plugin(&self, service_id: &str, plugin_id: &str) -> Option<&PluginDescriptor> {
        self.services.get(service_id)?.plugins.get(plugin_id)
    }

    /// The remote descriptor of a service, if it has one.
    pub fn remote_descriptor(&self, service_id: &str) -> Option<&RemoteDescriptor> {
        self.services.get(service_id)?.remote.as_ref()
    }

    /// Default init data and form of a plugin. `(None, None)` for unknown ids.
    pub fn plugin_form_and_init(
        &self,
        service_id: &str,
        plugin_id: &str,
    ) -> (Option<&Value>, Option<&Form>) {
        match self.plugin(service_id, plugin_id) {
            Some(plugin) => (plugin.init.as_ref(), plugin.form.as_ref()),
            None => (None, None),
        }
    }

    /// The runner factory of a plugin.
    pub fn plugin_implementation(
        &self,
        service_id: &str,
        plugin_id: &str,
    ) -> Option<Arc<dyn RunnerFactory>> {
        self.plugin(service_id, plugin_id)
            .map(|p| Arc::clone(&p.implementation))
    }

    /// The configuration schema of a plugin.
    ///
    /// # Errors
    /// [`ActionHubError::SchemaNotFound`] if either id is unknown.
    pub fn plugin_schema(
        &self,
        service_id: &str,
        plugin_id: &str,
    ) -> Result<&ConfigSchema, ActionHubError> {
        self.plugin(service_id, plugin_id)
            .map(|p| &p.schema)
            .ok_or_else(|| ActionHubError::SchemaNotFound {
                service_id: service_id.to_string(),
                plugin_id: plugin_id.to_string(),
            })
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
    }
}
