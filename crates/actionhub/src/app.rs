// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration into a catalog and an execution engine.

use std::sync::Arc;
use std::time::Duration;

use actionhub_config::{ActionHubConfig, UnknownFields};
use actionhub_core::ActionHubError;
use actionhub_engine::{builtin_registry, remote_http_client, BuiltinOptions, ExecutionEngine};
use actionhub_registry::Catalog;
use actionhub_schema::{SchemaValidator, UnknownFieldPolicy};
use tracing::info;

/// The assembled runtime: one catalog shared with the engine.
pub struct App {
    pub catalog: Arc<Catalog>,
    pub engine: ExecutionEngine,
}

impl App {
    pub fn from_config(config: &ActionHubConfig) -> Result<Self, ActionHubError> {
        let client = remote_http_client(Duration::from_secs(config.remote.timeout_secs))?;

        let options = BuiltinOptions {
            client,
            trello_api_base_url: config.trello.api_base_url.clone(),
            endpoints: config.remote.endpoints.clone(),
            disabled_services: config.catalog.disabled_services.clone(),
        };
        let validator = SchemaValidator::new(policy(config.engine.unknown_fields));
        let registry = builtin_registry(&options, validator)?;

        let catalog = Arc::new(Catalog::new(registry));
        let engine = ExecutionEngine::new(Arc::clone(&catalog))
            .with_context_allowlist(config.engine.context_allowlist.iter().cloned());

        info!(
            services = catalog.services().total,
            remote_endpoints = config.remote.endpoints.len(),
            unknown_fields = %config.engine.unknown_fields,
            "catalog ready"
        );
        Ok(Self { catalog, engine })
    }
}

fn policy(mode: UnknownFields) -> UnknownFieldPolicy {
    match mode {
        UnknownFields::Reject => UnknownFieldPolicy::Reject,
        UnknownFields::Allow => UnknownFieldPolicy::Allow,
    }
}
