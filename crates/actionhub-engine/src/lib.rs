// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution engine for ActionHub plugins.
//!
//! Drives a registered plugin through resolve, instantiate, context binding,
//! configure, and run. Also provides the remote runner variant and the
//! built-in services compiled into the binary.

pub mod builtin;
pub mod context;
pub mod engine;
pub mod lifecycle;
pub mod remote;

pub use builtin::{builtin_registry, builtin_services, BuiltinOptions, TRELLO_SERVICE_ID};
pub use context::{plugin_context, DEFAULT_CONTEXT_ALLOWLIST};
pub use engine::ExecutionEngine;
pub use lifecycle::{ExecutionReport, LifecycleState};
pub use remote::{remote_http_client, RemoteRunner, RemoteRunnerFactory};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actionhub_core::{
        ActionHubError, ActionRunner, ExecutionRequest, FnFactory, Params, PluginContext,
        PluginIdentity, ValidatedConfig,
    };
    use actionhub_registry::{Catalog, PluginDescriptor, Registry, ServiceSpec};
    use actionhub_schema::SchemaValidator;
    use async_trait::async_trait;
    use serde_json::Value;
    use tracing_test::traced_test;

    struct Broken;

    #[async_trait]
    impl ActionRunner for Broken {
        fn bind_context(&mut self, _context: PluginContext) {}

        async fn configure(&mut self, _config: ValidatedConfig) -> Result<(), ActionHubError> {
            Ok(())
        }

        async fn execute(&mut self, _params: Params) -> Result<Value, ActionHubError> {
            Err(ActionHubError::runtime("upstream timed out"))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn runtime_failures_are_logged_with_ids() {
        let plugin = PluginDescriptor::new(
            "broken-plugin",
            "Broken",
            PluginIdentity::new("Broken", "tests"),
            Arc::new(FnFactory::new(|| Box::new(Broken) as Box<dyn ActionRunner>)),
        );
        let registry = Registry::builder(SchemaValidator::default())
            .register(ServiceSpec::new("broken-service", "Broken").with_plugin(plugin))
            .build()
            .unwrap();
        let engine = ExecutionEngine::new(Arc::new(Catalog::new(registry)));

        let err = engine
            .run("broken-service", "broken-plugin", ExecutionRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ActionHubError::Runtime { .. }));
        assert!(logs_contain("plugin run failed"));
        assert!(logs_contain("broken-service"));
        assert!(logs_contain("broken-plugin"));
        assert!(logs_contain("upstream timed out"));
    }
}
