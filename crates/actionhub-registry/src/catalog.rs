// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared catalog handle and the read-only query surface.
//!
//! [`Catalog`] holds the current [`Registry`] snapshot behind an `ArcSwap`.
//! Readers load one snapshot per operation and never take a lock; a rebuild
//! replaces the whole snapshot, so readers observe either the old or the new
//! registry in full.

use std::collections::BTreeMap;
use std::sync::Arc;

use actionhub_core::{ActionHubError, ValidatedConfig};
use arc_swap::ArcSwap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::descriptor::{Form, RemoteDescriptor};
use crate::registry::Registry;

/// An `{id -> name}` listing with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub total: usize,
    pub result: BTreeMap<String, String>,
}

impl Listing {
    fn from_pairs(pairs: Vec<(&str, &str)>) -> Self {
        let result: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();
        Self {
            total: result.len(),
            result,
        }
    }
}

/// Pre-fill data for a plugin's configuration form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginForm {
    /// Default configuration; an empty object when the plugin declares none.
    pub init: Value,
    /// Form descriptor, or `null`.
    pub form: Option<Form>,
}

/// Atomically replaceable registry snapshot plus catalog queries.
pub struct Catalog {
    current: ArcSwap<Registry>,
}

impl Catalog {
    pub fn new(registry: Registry) -> Self {
        Self {
            current: ArcSwap::from_pointee(registry),
        }
    }

    /// The current snapshot. Holding it pins that version of the registry.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.current.load_full()
    }

    /// Replace the snapshot wholesale, returning the previous one.
    pub fn replace(&self, registry: Registry) -> Arc<Registry> {
        let services = registry.len();
        let previous = self.current.swap(Arc::new(registry));
        info!(services, "catalog snapshot replaced");
        previous
    }

    /// All services.
    pub fn services(&self) -> Listing {
        let registry = self.current.load();
        Listing::from_pairs(registry.list_services())
    }

    /// Plugins of one service; empty listing for an unknown service.
    pub fn plugins(&self, service_id: &str) -> Listing {
        let registry = self.current.load();
        Listing::from_pairs(registry.list_plugins(service_id))
    }

    /// Default init data and form for a plugin; `{init: {}, form: null}` on a miss.
    pub fn plugin_form(&self, service_id: &str, plugin_id: &str) -> PluginForm {
        let registry = self.current.load();
        let (init, form) = registry.plugin_form_and_init(service_id, plugin_id);
        PluginForm {
            init: init
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            form: form.cloned(),
        }
    }

    /// Remote descriptor of a service, if any.
    pub fn remote_descriptor(&self, service_id: &str) -> Option<RemoteDescriptor> {
        self.current.load().remote_descriptor(service_id).cloned()
    }

    /// Validate a candidate configuration against a plugin's schema.
    ///
    /// # Errors
    /// [`ActionHubError::SchemaNotFound`] for unknown ids,
    /// [`ActionHubError::Validation`] when the payload is rejected.
    pub fn validate_config(
        &self,
        service_id: &str,
        plugin_id: &str,
        payload: &Value,
    ) -> Result<ValidatedConfig, ActionHubError> {
        let registry = self.current.load();
        let schema = registry.plugin_schema(service_id, plugin_id)?;
        let result = registry.validator().validate(schema, payload);
        debug!(
            service_id,
            plugin_id,
            valid = result.is_ok(),
            "configuration validated"
        );
        result
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("services", &self.current.load().len())
            .finish()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Registry::empty())
    }
}
