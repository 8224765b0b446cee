// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Harness that assembles a catalog and engine around a recording plugin.
//!
//! The registered plugin (`S1`/`P1`) requires a string `cardName` and accepts
//! an optional `position` that defaults to `"top"`.

use std::sync::Arc;

use actionhub_core::{ActionHubError, ExecutionRequest, PluginIdentity};
use actionhub_engine::{ExecutionEngine, ExecutionReport};
use actionhub_registry::{Catalog, PluginDescriptor, Registry, ServiceSpec};
use actionhub_schema::{ConfigSchema, SchemaValidator, UnknownFieldPolicy};
use serde_json::{json, Value};

use crate::recording::{Behavior, CallLog, CountingFactory};

pub const TEST_SERVICE_ID: &str = "S1";
pub const TEST_PLUGIN_ID: &str = "P1";

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    behavior: Behavior,
    policy: UnknownFieldPolicy,
    context_allowlist: Option<Vec<String>>,
    extra_services: Vec<ServiceSpec>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            behavior: Behavior::default(),
            policy: UnknownFieldPolicy::default(),
            context_allowlist: None,
            extra_services: Vec::new(),
        }
    }

    /// How the registered plugin's runners respond.
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_policy(mut self, policy: UnknownFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_context_allowlist<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context_allowlist = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Register an additional service next to `S1`.
    pub fn with_service(mut self, service: ServiceSpec) -> Self {
        self.extra_services.push(service);
        self
    }

    pub fn build(self) -> Result<TestHarness, ActionHubError> {
        let factory = Arc::new(CountingFactory::new(self.behavior));

        let plugin = PluginDescriptor::new(
            TEST_PLUGIN_ID,
            "Add card",
            PluginIdentity::new("RecordingRunner", "actionhub_test_utils::recording"),
            factory.clone(),
        )
        .with_schema(card_schema())
        .with_init(json!({"cardName": ""}))
        .with_ports(["payload"], ["payload", "error"]);

        let registry = Registry::builder(SchemaValidator::new(self.policy))
            .register(ServiceSpec::new(TEST_SERVICE_ID, "Trello").with_plugin(plugin))
            .register_all(self.extra_services)
            .build()?;

        let catalog = Arc::new(Catalog::new(registry));
        let mut engine = ExecutionEngine::new(Arc::clone(&catalog));
        if let Some(keys) = self.context_allowlist {
            engine = engine.with_context_allowlist(keys);
        }

        Ok(TestHarness {
            catalog,
            engine,
            factory,
        })
    }
}

/// Schema of the recording plugin.
pub fn card_schema() -> ConfigSchema {
    ConfigSchema::new(json!({
        "type": "object",
        "properties": {
            "cardName": {"type": "string"},
            "position": {"type": "string", "enum": ["top", "bottom"], "default": "top"}
        },
        "required": ["cardName"]
    }))
}

/// An assembled catalog and engine with a recording plugin at `S1`/`P1`.
pub struct TestHarness {
    pub catalog: Arc<Catalog>,
    pub engine: ExecutionEngine,
    pub factory: Arc<CountingFactory>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn log(&self) -> &CallLog {
        self.factory.log()
    }

    /// Run `S1`/`P1` with the given context, init, and params.
    pub async fn run(
        &self,
        context: Value,
        init: Value,
        params: Value,
    ) -> Result<ExecutionReport, ActionHubError> {
        let request = ExecutionRequest {
            context: context.as_object().cloned().unwrap_or_default(),
            init,
            params: params.as_object().cloned().unwrap_or_default(),
        };
        self.engine
            .run(TEST_SERVICE_ID, TEST_PLUGIN_ID, request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_runs_the_recording_plugin() {
        let harness = TestHarness::builder().build().unwrap();
        let report = harness
            .run(json!({}), json!({"cardName": "Buy milk"}), json!({"payload": 1}))
            .await
            .unwrap();

        assert_eq!(report.result["config"]["position"], "top");
        assert_eq!(report.result["params"]["payload"], 1);
        assert_eq!(harness.factory.created(), 1);
        assert_eq!(harness.log().execute_count(), 1);
    }
}
