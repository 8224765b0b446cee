// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ActionHub plugin engine.
//!
//! This crate provides the error type, the shared data types (field errors,
//! execution requests, plugin identity), and the runner capability traits
//! used by the registry and the execution engine.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ActionHubError, ErrorCategory};
pub use traits::{ActionRunner, FnFactory, RunnerFactory};
pub use types::{
    ErrorCode, ExecutionRequest, FieldError, Params, PluginContext, PluginIdentity,
    ValidatedConfig,
};
