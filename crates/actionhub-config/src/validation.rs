// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ActionHubConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &ActionHubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.engine.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.log_level `{}` is not one of {}",
                config.engine.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config
        .engine
        .context_allowlist
        .iter()
        .any(|key| key.trim().is_empty())
    {
        errors.push(ConfigError::Validation {
            message: "engine.context_allowlist entries must not be empty".to_string(),
        });
    }

    if config.remote.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "remote.timeout_secs must be greater than zero".to_string(),
        });
    }

    for (service_id, endpoint) in &config.remote.endpoints {
        if service_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "remote.endpoints keys must be non-empty service ids".to_string(),
            });
        }
        if !is_http_url(endpoint) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "remote.endpoints.{service_id} `{endpoint}` must be an http:// or https:// URL"
                ),
            });
        }
    }

    if !is_http_url(&config.trello.api_base_url) {
        errors.push(ConfigError::Validation {
            message: format!(
                "trello.api_base_url `{}` must be an http:// or https:// URL",
                config.trello.api_base_url
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .is_some_and(|host| !host.is_empty() && !host.starts_with('/'))
    })
}
