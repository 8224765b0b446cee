// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Top-level ActionHub configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActionHubConfig {
    /// Execution engine and validator settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Remote microservice runner settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Built-in catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Built-in Trello service settings.
    #[serde(default)]
    pub trello: TrelloConfig,
}

/// How the validator treats fields a schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnknownFields {
    #[default]
    Reject,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Caller context keys passed through to plugins.
    #[serde(default = "default_context_allowlist")]
    pub context_allowlist: Vec<String>,

    #[serde(default)]
    pub unknown_fields: UnknownFields,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            context_allowlist: default_context_allowlist(),
            unknown_fields: UnknownFields::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_context_allowlist() -> Vec<String> {
    vec!["node".to_string()]
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// HTTP timeout for remote runner requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Service id to base URL of the microservice that executes its plugins.
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            endpoints: BTreeMap::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Built-in service ids left out of the registry.
    #[serde(default)]
    pub disabled_services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrelloConfig {
    /// Trello REST API base URL.
    #[serde(default = "default_trello_api_base_url")]
    pub api_base_url: String,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_trello_api_base_url(),
        }
    }
}

fn default_trello_api_base_url() -> String {
    "https://api.trello.com/1".to_string()
}
