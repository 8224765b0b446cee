// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ActionHub plugin engine.

use strum::Display;
use thiserror::Error;

use crate::types::FieldError;

/// The primary error type used across the registry, validator, and engine.
#[derive(Debug, Error)]
pub enum ActionHubError {
    /// A schema was requested for an unknown service/plugin pair.
    #[error("no configuration schema for plugin `{plugin_id}` in service `{service_id}`")]
    SchemaNotFound {
        service_id: String,
        plugin_id: String,
    },

    /// The engine could not resolve the plugin to execute.
    #[error("plugin `{plugin_id}` not found in service `{service_id}`")]
    PluginNotFound {
        service_id: String,
        plugin_id: String,
    },

    /// Configuration data failed schema checks. Field errors are ordered.
    #[error("configuration rejected with {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The plugin's run phase failed.
    #[error("plugin runtime error: {message}")]
    Runtime {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A remote microservice could not be reached or answered with an error.
    #[error("remote execution error: {message}")]
    Remote {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller cancelled the invocation while a phase was pending.
    #[error("execution cancelled during {phase}")]
    Cancelled { phase: String },

    /// Registry assembly rejected a descriptor (duplicate id, bad init data).
    #[error("registry error: {0}")]
    Registry(String),

    /// A configuration schema could not be compiled into a validator.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// Process configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionHubError {
    /// Builds a runtime error with no underlying source.
    pub fn runtime(message: impl Into<String>) -> Self {
        ActionHubError::Runtime {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a validation error carrying a single field error.
    pub fn invalid_field(field: FieldError) -> Self {
        ActionHubError::Validation(vec![field])
    }

    /// Returns the field errors if this is a validation failure.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            ActionHubError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns true for both flavours of "unknown service/plugin".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ActionHubError::SchemaNotFound { .. } | ActionHubError::PluginNotFound { .. }
        )
    }

    /// Classifies the error for transport mapping.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ActionHubError::SchemaNotFound { .. } | ActionHubError::PluginNotFound { .. } => {
                ErrorCategory::NotFound
            }
            ActionHubError::Validation(_) => ErrorCategory::Unprocessable,
            ActionHubError::Runtime { .. } | ActionHubError::Remote { .. } => {
                ErrorCategory::Runtime
            }
            ActionHubError::Cancelled { .. } => ErrorCategory::Cancelled,
            ActionHubError::Registry(_)
            | ActionHubError::Schema(_)
            | ActionHubError::Config(_)
            | ActionHubError::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Transport-agnostic classification of an [`ActionHubError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Unknown service or plugin on an operation that requires one.
    NotFound,
    /// Input was rejected by a schema; the caller can resubmit.
    Unprocessable,
    /// The plugin itself failed.
    Runtime,
    /// The caller abandoned the invocation.
    Cancelled,
    /// Anything else.
    Internal,
}

impl ErrorCategory {
    /// HTTP-equivalent status code for this category.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCategory::NotFound => 404,
            ErrorCategory::Unprocessable => 422,
            ErrorCategory::Runtime => 500,
            ErrorCategory::Cancelled => 499,
            ErrorCategory::Internal => 500,
        }
    }
}
