// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration schema validation for ActionHub plugins.
//!
//! Plugin configuration schemas are JSON Schema documents. The
//! [`SchemaValidator`] applies declared defaults, enforces the unknown-field
//! policy, and reports violations through the [`normalize`] module as ordered
//! [`FieldError`](actionhub_core::FieldError) records with dotted/bracketed
//! paths, so the validate operation and the engine's configure phase return
//! identical error shapes.

pub mod defaults;
pub mod normalize;
pub mod validator;

pub use normalize::{normalize_errors, pointer_to_path};
pub use validator::{CompiledSchema, ConfigSchema, SchemaValidator, UnknownFieldPolicy};
