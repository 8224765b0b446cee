// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-phase runner capability set and the factory that instantiates runners.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ActionHubError;
use crate::types::{Params, PluginContext, ValidatedConfig};

/// A single plugin instance driven through configure, then execute.
///
/// The engine creates a fresh instance per invocation, so implementations may
/// keep per-request state in `&mut self` without synchronization. The engine
/// never branches on the concrete type; in-process and remote runners look the
/// same from its side.
#[async_trait]
pub trait ActionRunner: Send {
    /// Receives the allow-listed execution context, with identity injected.
    ///
    /// Called once, before [`configure`](Self::configure).
    fn bind_context(&mut self, context: PluginContext);

    /// Applies configuration. Malformed data fails with
    /// [`ActionHubError::Validation`].
    async fn configure(&mut self, config: ValidatedConfig) -> Result<(), ActionHubError>;

    /// Runs the plugin's primary behavior. The returned value is passed
    /// through to the caller unexamined.
    async fn execute(&mut self, params: Params) -> Result<Value, ActionHubError>;

    /// Invoked when the caller cancels while a phase is pending.
    async fn abort(&mut self) {}
}

/// Creates fresh [`ActionRunner`] instances for one registered plugin.
pub trait RunnerFactory: Send + Sync {
    /// Create a new runner instance. Instances are never shared across invocations.
    fn create(&self) -> Result<Box<dyn ActionRunner>, ActionHubError>;
}

/// Adapts a constructor closure into a [`RunnerFactory`].
pub struct FnFactory<F>(F);

impl<F> FnFactory<F>
where
    F: Fn() -> Box<dyn ActionRunner> + Send + Sync,
{
    pub fn new(constructor: F) -> Self {
        Self(constructor)
    }
}

impl<F> RunnerFactory for FnFactory<F>
where
    F: Fn() -> Box<dyn ActionRunner> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn ActionRunner>, ActionHubError> {
        Ok((self.0)())
    }
}
