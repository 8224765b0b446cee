// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The execution engine: resolve, instantiate, inject context, configure, run.
//!
//! Each invocation loads one registry snapshot, creates a fresh runner, and
//! walks the lifecycle once. Configuration errors (from the schema or from the
//! runner's configure phase) stop the invocation before the run phase.

use std::future::Future;
use std::sync::Arc;

use actionhub_core::{ActionHubError, ExecutionRequest};
use actionhub_registry::Catalog;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::{plugin_context, DEFAULT_CONTEXT_ALLOWLIST};
use crate::lifecycle::{ExecutionReport, Lifecycle, LifecycleState};

/// Runs registered plugins through the two-phase lifecycle.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    catalog: Arc<Catalog>,
    context_allowlist: Vec<String>,
}

impl ExecutionEngine {
    /// Create an engine over a shared catalog with the default context allowlist.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            context_allowlist: DEFAULT_CONTEXT_ALLOWLIST
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }

    /// Replace the set of caller context keys copied into plugin context.
    pub fn with_context_allowlist<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context_allowlist = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn context_allowlist(&self) -> &[String] {
        &self.context_allowlist
    }

    /// Execute a plugin to completion.
    pub async fn run(
        &self,
        service_id: &str,
        plugin_id: &str,
        request: ExecutionRequest,
    ) -> Result<ExecutionReport, ActionHubError> {
        self.run_with_cancellation(service_id, plugin_id, request, CancellationToken::new())
            .await
    }

    /// Execute a plugin, abandoning it if `cancel` fires during configure or run.
    ///
    /// On cancellation the runner's `abort` hook is awaited and
    /// [`ActionHubError::Cancelled`] is returned. Any external effects the
    /// runner already caused are its own responsibility.
    pub async fn run_with_cancellation(
        &self,
        service_id: &str,
        plugin_id: &str,
        request: ExecutionRequest,
        cancel: CancellationToken,
    ) -> Result<ExecutionReport, ActionHubError> {
        let mut lifecycle = Lifecycle::new(service_id, plugin_id);
        let outcome = self
            .drive(service_id, plugin_id, request, &cancel, &mut lifecycle)
            .await;

        match outcome {
            Ok(result) => {
                info!(service_id, plugin_id, "plugin run completed");
                Ok(lifecycle.complete(result))
            }
            Err(err) => {
                let reached = lifecycle.current();
                lifecycle.enter(LifecycleState::Failed);
                log_failure(service_id, plugin_id, reached, &err);
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        service_id: &str,
        plugin_id: &str,
        request: ExecutionRequest,
        cancel: &CancellationToken,
        lifecycle: &mut Lifecycle<'_>,
    ) -> Result<serde_json::Value, ActionHubError> {
        let registry = self.catalog.snapshot();

        let plugin = registry.plugin(service_id, plugin_id).ok_or_else(|| {
            ActionHubError::PluginNotFound {
                service_id: service_id.to_string(),
                plugin_id: plugin_id.to_string(),
            }
        })?;
        lifecycle.enter(LifecycleState::Resolved);

        let mut runner = plugin.implementation.create()?;
        lifecycle.enter(LifecycleState::Instantiated);

        let context = plugin_context(&request.context, &self.context_allowlist, &plugin.identity);
        debug!(service_id, plugin_id, context = ?context.as_map(), "binding plugin context");
        runner.bind_context(context);

        debug!(service_id, plugin_id, init_keys = ?init_keys(&request.init), "configuring plugin");
        let config = registry.validator().validate(&plugin.schema, &request.init)?;
        match until_cancelled(cancel, runner.configure(config)).await {
            Some(outcome) => outcome?,
            None => {
                runner.abort().await;
                return Err(ActionHubError::Cancelled {
                    phase: "configure".to_string(),
                });
            }
        }
        lifecycle.enter(LifecycleState::Configured);

        let result = match until_cancelled(cancel, runner.execute(request.params)).await {
            Some(outcome) => outcome?,
            None => {
                runner.abort().await;
                return Err(ActionHubError::Cancelled {
                    phase: "run".to_string(),
                });
            }
        };
        lifecycle.enter(LifecycleState::Ran);

        Ok(result)
    }
}

/// Await `future` unless `cancel` fires first.
/// Field names of a configure payload. Values are never logged; they carry
/// credentials.
fn init_keys(init: &serde_json::Value) -> Vec<&str> {
    init.as_object()
        .map(|fields| fields.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = future => Some(output),
    }
}

fn log_failure(
    service_id: &str,
    plugin_id: &str,
    reached: Option<LifecycleState>,
    err: &ActionHubError,
) {
    let reached = reached.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string());
    match err {
        ActionHubError::PluginNotFound { .. } | ActionHubError::Validation(_) => {
            debug!(service_id, plugin_id, reached = %reached, error = %err, "plugin run rejected");
        }
        ActionHubError::Cancelled { .. } => {
            info!(service_id, plugin_id, reached = %reached, "plugin run cancelled");
        }
        _ => {
            warn!(service_id, plugin_id, reached = %reached, error = %err, "plugin run failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use actionhub_core::{
        ActionRunner, ErrorCode, FieldError, Params, PluginContext, PluginIdentity,
        RunnerFactory, ValidatedConfig,
    };
    use actionhub_registry::{PluginDescriptor, Registry, ServiceSpec};
    use actionhub_schema::{ConfigSchema, SchemaValidator};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Calls {
        created: AtomicUsize,
        executed: AtomicUsize,
        aborted: AtomicUsize,
        context: Mutex<Option<PluginContext>>,
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Echo,
        RejectConfig,
        FailRun,
        Hang,
    }

    struct Scripted {
        calls: Arc<Calls>,
        behavior: Behavior,
        config: Option<Value>,
    }

    #[async_trait]
    impl ActionRunner for Scripted {
        fn bind_context(&mut self, context: PluginContext) {
            *self.calls.context.lock().unwrap() = Some(context);
        }

        async fn configure(&mut self, config: ValidatedConfig) -> Result<(), ActionHubError> {
            if let Behavior::RejectConfig = self.behavior {
                return Err(ActionHubError::invalid_field(FieldError::new(
                    "cardName",
                    "card name must not be blank",
                    ErrorCode::Constraint,
                )));
            }
            self.config = Some(config.into_value());
            Ok(())
        }

        async fn execute(&mut self, params: Params) -> Result<Value, ActionHubError> {
            self.calls.executed.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::FailRun => Err(ActionHubError::runtime("board is archived")),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                _ => Ok(json!({"config": self.config, "params": params})),
            }
        }

        async fn abort(&mut self) {
            self.calls.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct ScriptedFactory {
        calls: Arc<Calls>,
        behavior: Behavior,
    }

    impl RunnerFactory for ScriptedFactory {
        fn create(&self) -> Result<Box<dyn ActionRunner>, ActionHubError> {
            self.calls.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Scripted {
                calls: Arc::clone(&self.calls),
                behavior: self.behavior,
                config: None,
            }))
        }
    }

    fn engine(behavior: Behavior) -> (ExecutionEngine, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let plugin = PluginDescriptor::new(
            "P1",
            "Add card",
            PluginIdentity::new("Scripted", "engine::tests"),
            Arc::new(ScriptedFactory {
                calls: Arc::clone(&calls),
                behavior,
            }),
        )
        .with_schema(ConfigSchema::new(json!({
            "type": "object",
            "properties": {"cardName": {"type": "string"}},
            "required": ["cardName"]
        })));
        let registry = Registry::builder(SchemaValidator::default())
            .register(ServiceSpec::new("S1", "Service").with_plugin(plugin))
            .build()
            .unwrap();
        let engine = ExecutionEngine::new(Arc::new(Catalog::new(registry)));
        (engine, calls)
    }

    fn request(init: Value) -> ExecutionRequest {
        ExecutionRequest {
            context: json!({"node": {"id": "node-1"}, "secret": 1})
                .as_object()
                .cloned()
                .unwrap(),
            init,
            params: Params::new(),
        }
    }

    #[tokio::test]
    async fn successful_run_walks_every_state() {
        let (engine, calls) = engine(Behavior::Echo);
        let report = engine
            .run("S1", "P1", request(json!({"cardName": "Buy milk"})))
            .await
            .unwrap();

        assert_eq!(
            report.transitions,
            vec![
                LifecycleState::Resolved,
                LifecycleState::Instantiated,
                LifecycleState::Configured,
                LifecycleState::Ran,
                LifecycleState::Completed,
            ]
        );
        assert_eq!(report.result["config"]["cardName"], "Buy milk");
        assert_eq!(calls.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn configure_logging_names_fields_without_values() {
        let (engine, _calls) = engine(Behavior::Echo);
        engine
            .run("S1", "P1", request(json!({"cardName": "tok-9f8e7d"})))
            .await
            .unwrap();

        assert!(logs_contain("configuring plugin"));
        assert!(logs_contain("cardName"));
        assert!(!logs_contain("tok-9f8e7d"));
    }

    #[tokio::test]
    async fn context_is_restricted_and_stamped() {
        let (engine, calls) = engine(Behavior::Echo);
        engine
            .run("S1", "P1", request(json!({"cardName": "x"})))
            .await
            .unwrap();

        let context = calls.context.lock().unwrap().clone().unwrap();
        assert!(context.get("secret").is_none());
        assert_eq!(context.node().unwrap()["id"], "node-1");
        assert_eq!(context.class_name(), Some("Scripted"));
        assert_eq!(context.module(), Some("engine::tests"));
    }

    #[tokio::test]
    async fn schema_rejection_stops_before_run() {
        let (engine, calls) = engine(Behavior::Echo);
        let err = engine.run("S1", "P1", request(json!({}))).await.unwrap_err();

        assert_eq!(err.category().status_code(), 422);
        assert_eq!(err.field_errors().unwrap()[0].path, "cardName");
        assert_eq!(calls.executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn runner_configure_rejection_stops_before_run() {
        let (engine, calls) = engine(Behavior::RejectConfig);
        let err = engine
            .run("S1", "P1", request(json!({"cardName": " "})))
            .await
            .unwrap_err();

        assert_eq!(err.field_errors().unwrap()[0].code, ErrorCode::Constraint);
        assert_eq!(calls.executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_plugin_is_not_instantiated() {
        let (engine, calls) = engine(Behavior::Echo);
        let err = engine
            .run("S1", "nope", request(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionHubError::PluginNotFound { .. }));
        assert_eq!(calls.created.load(Ordering::SeqCst), 0);

        let err = engine.run("S9", "P1", request(json!({}))).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn runtime_errors_pass_through() {
        let (engine, _) = engine(Behavior::FailRun);
        let err = engine
            .run("S1", "P1", request(json!({"cardName": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionHubError::Runtime { ref message, .. } if message == "board is archived"));
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_run() {
        let (engine, calls) = engine(Behavior::Hang);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let handle = tokio::spawn(async move {
            engine
                .run_with_cancellation("S1", "P1", request(json!({"cardName": "x"})), cancel)
                .await
        });
        while calls.executed.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        trigger.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ActionHubError::Cancelled { ref phase } if phase == "run"));
        assert_eq!(calls.aborted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn each_invocation_gets_a_fresh_instance() {
        let (engine, calls) = engine(Behavior::Echo);
        for _ in 0..3 {
            engine
                .run("S1", "P1", request(json!({"cardName": "x"})))
                .await
                .unwrap();
        }
        assert_eq!(calls.created.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn run_uses_the_snapshot_current_at_call_time() {
        let (engine, _) = engine(Behavior::Echo);
        engine.catalog().replace(Registry::empty());
        let err = engine
            .run("S1", "P1", request(json!({"cardName": "x"})))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
