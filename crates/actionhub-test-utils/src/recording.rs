// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording runner test double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actionhub_core::{
    ActionHubError, ActionRunner, FieldError, Params, PluginContext, RunnerFactory,
    ValidatedConfig,
};
use async_trait::async_trait;
use serde_json::{json, Value};

/// One lifecycle call observed by a [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerCall {
    BindContext(PluginContext),
    Configure(Value),
    Execute(Params),
    Abort,
}

/// How a [`RecordingRunner`] responds.
#[derive(Debug, Clone, Default)]
pub enum Behavior {
    /// Configure succeeds; run echoes the configuration and params.
    #[default]
    Echo,
    /// Configure fails with these field errors.
    RejectConfig(Vec<FieldError>),
    /// Run fails with a runtime error carrying this message.
    FailRun(String),
    /// Run returns this value.
    Return(Value),
}

/// Shared, append-only log of runner calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<RunnerCall>>>);

impl CallLog {
    fn lock(&self) -> MutexGuard<'_, Vec<RunnerCall>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, call: RunnerCall) {
        self.lock().push(call);
    }

    /// Snapshot of every call recorded so far, in order.
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.lock().clone()
    }

    /// Contexts received through `bind_context`.
    pub fn contexts(&self) -> Vec<PluginContext> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                RunnerCall::BindContext(ctx) => Some(ctx.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn configure_count(&self) -> usize {
        self.count(|c| matches!(c, RunnerCall::Configure(_)))
    }

    pub fn execute_count(&self) -> usize {
        self.count(|c| matches!(c, RunnerCall::Execute(_)))
    }

    fn count(&self, predicate: impl Fn(&RunnerCall) -> bool) -> usize {
        self.lock().iter().filter(|&c| predicate(c)).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Runner that records its calls and responds per its [`Behavior`].
#[derive(Debug)]
pub struct RecordingRunner {
    log: CallLog,
    behavior: Behavior,
    config: Option<Value>,
}

impl RecordingRunner {
    pub fn new(log: CallLog, behavior: Behavior) -> Self {
        Self {
            log,
            behavior,
            config: None,
        }
    }
}

#[async_trait]
impl ActionRunner for RecordingRunner {
    fn bind_context(&mut self, context: PluginContext) {
        self.log.push(RunnerCall::BindContext(context));
    }

    async fn configure(&mut self, config: ValidatedConfig) -> Result<(), ActionHubError> {
        let value = config.into_value();
        self.log.push(RunnerCall::Configure(value.clone()));
        if let Behavior::RejectConfig(errors) = &self.behavior {
            return Err(ActionHubError::Validation(errors.clone()));
        }
        self.config = Some(value);
        Ok(())
    }

    async fn execute(&mut self, params: Params) -> Result<Value, ActionHubError> {
        self.log.push(RunnerCall::Execute(params.clone()));
        match &self.behavior {
            Behavior::FailRun(message) => Err(ActionHubError::runtime(message.clone())),
            Behavior::Return(value) => Ok(value.clone()),
            _ => Ok(json!({"config": self.config, "params": params})),
        }
    }

    async fn abort(&mut self) {
        self.log.push(RunnerCall::Abort);
    }
}

/// Factory that counts instantiations; every runner shares one [`CallLog`].
#[derive(Debug, Default)]
pub struct CountingFactory {
    created: AtomicUsize,
    log: CallLog,
    behavior: Behavior,
}

impl CountingFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            created: AtomicUsize::new(0),
            log: CallLog::default(),
            behavior,
        }
    }

    /// Number of runners created so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl RunnerFactory for CountingFactory {
    fn create(&self) -> Result<Box<dyn ActionRunner>, ActionHubError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingRunner::new(
            self.log.clone(),
            self.behavior.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actionhub_core::ErrorCode;

    #[tokio::test]
    async fn records_calls_in_order() {
        let factory = CountingFactory::default();
        let mut runner = factory.create().unwrap();
        runner.bind_context(PluginContext::default());
        runner
            .configure(ValidatedConfig::from_checked(json!({"a": 1})))
            .await
            .unwrap();
        runner.execute(Params::new()).await.unwrap();

        assert_eq!(factory.created(), 1);
        let calls = factory.log().calls();
        assert!(matches!(calls[0], RunnerCall::BindContext(_)));
        assert_eq!(calls[1], RunnerCall::Configure(json!({"a": 1})));
        assert!(matches!(calls[2], RunnerCall::Execute(_)));
    }

    #[tokio::test]
    async fn reject_config_returns_field_errors() {
        let factory = CountingFactory::new(Behavior::RejectConfig(vec![FieldError::new(
            "cardName",
            "too short",
            ErrorCode::Length,
        )]));
        let mut runner = factory.create().unwrap();
        let err = runner
            .configure(ValidatedConfig::from_checked(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].path, "cardName");
    }
}
