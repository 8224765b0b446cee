// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Services compiled into the ActionHub binary.
//!
//! Each built-in service is assembled from [`BuiltinOptions`]. A service with a
//! configured remote endpoint has its plugins registered with the remote
//! runner; otherwise the in-process implementation serves them.

pub mod trello;

use std::collections::BTreeMap;
use std::sync::Arc;

use actionhub_core::{ActionHubError, RunnerFactory};
use actionhub_registry::{
    Documentation, PortDoc, Registry, RemoteDescriptor, RemoteMetadata, RemoteSpec, ServiceSpec,
};
use actionhub_schema::SchemaValidator;
use tracing::{debug, info};

use crate::remote::RemoteRunnerFactory;

pub const TRELLO_SERVICE_ID: &str = "a307b281-2629-4c12-b6e3-df1ec9bca35a";

/// Inputs for assembling the built-in services.
#[derive(Debug, Clone)]
pub struct BuiltinOptions {
    /// Client shared by every runner that performs HTTP calls.
    pub client: reqwest::Client,
    pub trello_api_base_url: String,
    /// Service id to base URL of the microservice hosting it.
    pub endpoints: BTreeMap<String, String>,
    /// Service ids left out of the catalog.
    pub disabled_services: Vec<String>,
}

impl BuiltinOptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            trello_api_base_url: trello::DEFAULT_API_BASE_URL.to_string(),
            endpoints: BTreeMap::new(),
            disabled_services: Vec::new(),
        }
    }
}

/// Returns the specs of every enabled built-in service.
pub fn builtin_services(options: &BuiltinOptions) -> Vec<ServiceSpec> {
    let services = vec![trello_service(options)];
    services
        .into_iter()
        .filter(|service| {
            let disabled = options.disabled_services.contains(&service.id);
            if disabled {
                debug!(service_id = %service.id, "built-in service disabled");
            }
            !disabled
        })
        .collect()
}

/// Builds a registry holding the enabled built-in services.
pub fn builtin_registry(
    options: &BuiltinOptions,
    validator: SchemaValidator,
) -> Result<Registry, ActionHubError> {
    let registry = Registry::builder(validator)
        .register_all(builtin_services(options))
        .build()?;
    info!(services = registry.len(), "built-in registry assembled");
    Ok(registry)
}

fn trello_service(options: &BuiltinOptions) -> ServiceSpec {
    let endpoint = options.endpoints.get(TRELLO_SERVICE_ID).cloned();

    let implementation: Arc<dyn RunnerFactory> = match &endpoint {
        Some(endpoint) => Arc::new(RemoteRunnerFactory::new(
            options.client.clone(),
            endpoint.clone(),
            TRELLO_SERVICE_ID,
            trello::ADD_CARD_PLUGIN_ID,
        )),
        None => Arc::new(trello::TrelloCardAdderFactory::new(
            options.client.clone(),
            options.trello_api_base_url.clone(),
        )),
    };

    ServiceSpec::new(TRELLO_SERVICE_ID, "Trello")
        .with_remote(trello_remote_descriptor(endpoint))
        .with_plugin(trello::add_card_plugin(implementation))
}

fn trello_remote_descriptor(endpoint: Option<String>) -> RemoteDescriptor {
    RemoteDescriptor {
        start: false,
        spec: RemoteSpec {
            module: "actionhub_engine::remote".to_string(),
            class_name: "RemoteRunner".to_string(),
            inputs: vec!["payload".to_string()],
            outputs: vec!["payload".to_string(), "error".to_string()],
            version: semver::Version::new(0, 7, 2),
            license: Some("MIT".to_string()),
            author: Some("Risto Kowaczewski".to_string()),
        },
        metadata: RemoteMetadata {
            name: "Trello Microservice".to_string(),
            desc: "Microservice that runs Trello plugins.".to_string(),
            icon: Some("trello".to_string()),
            group: vec!["Connectors".to_string()],
            remote: true,
            documentation: Documentation {
                inputs: [(
                    "payload".to_string(),
                    PortDoc::new("This port takes payload object."),
                )]
                .into_iter()
                .collect(),
                outputs: [(
                    "payload".to_string(),
                    PortDoc::new("This port returns microservice response."),
                )]
                .into_iter()
                .collect(),
            },
        },
        endpoint,
    }
}
