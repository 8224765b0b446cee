// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Each returns the JSON document to print.

use std::io::Read;

use actionhub_core::{ActionHubError, ErrorCode, ExecutionRequest, FieldError};
use actionhub_engine::ExecutionEngine;
use actionhub_registry::Catalog;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ActionHubError> {
    serde_json::to_value(value).map_err(|e| ActionHubError::Internal(e.to_string()))
}

pub fn services(catalog: &Catalog) -> Result<Value, ActionHubError> {
    to_json(&catalog.services())
}

pub fn plugins(catalog: &Catalog, service_id: &str) -> Result<Value, ActionHubError> {
    to_json(&catalog.plugins(service_id))
}

pub fn form(catalog: &Catalog, service_id: &str, plugin_id: &str) -> Result<Value, ActionHubError> {
    to_json(&catalog.plugin_form(service_id, plugin_id))
}

/// Remote descriptor of a service, or `null`.
pub fn registry(catalog: &Catalog, service_id: &str) -> Result<Value, ActionHubError> {
    to_json(&catalog.remote_descriptor(service_id))
}

/// Validate configuration data; echoes it back with declared defaults applied.
pub fn validate(
    catalog: &Catalog,
    service_id: &str,
    plugin_id: &str,
    payload: &Value,
) -> Result<Value, ActionHubError> {
    let config = catalog.validate_config(service_id, plugin_id, payload)?;
    Ok(json!({"valid": true, "config": config.into_value()}))
}

pub async fn run(
    engine: &ExecutionEngine,
    service_id: &str,
    plugin_id: &str,
    request: Value,
    cancel: CancellationToken,
) -> Result<Value, ActionHubError> {
    let request: ExecutionRequest = serde_json::from_value(request)
        .map_err(|e| {
            ActionHubError::invalid_field(FieldError::new(
                "",
                format!("malformed execution request: {e}"),
                ErrorCode::Type,
            ))
        })?;
    let report = engine
        .run_with_cancellation(service_id, plugin_id, request, cancel)
        .await?;
    to_json(&report)
}

/// Parse a JSON argument; `-` reads it from stdin.
///
/// Malformed JSON is the caller's mistake and is reported as a root `type`
/// field error, the same as a malformed execution request.
pub fn read_json_arg(arg: &str) -> Result<Value, ActionHubError> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| ActionHubError::Config(format!("failed to read stdin: {e}")))?;
        buf
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).map_err(|e| {
        ActionHubError::invalid_field(FieldError::new(
            "",
            format!("invalid JSON argument: {e}"),
            ErrorCode::Type,
        ))
    })
}

/// Error document printed on failure.
pub fn error_body(err: &ActionHubError) -> Value {
    let category = err.category();
    let mut body = json!({
        "status": category.status_code(),
        "category": category.to_string(),
        "message": err.to_string(),
    });
    if let Some(errors) = err.field_errors() {
        body["errors"] = json!(errors);
    }
    body
}
