// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle states of a single plugin invocation.

use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::debug;

/// States an invocation passes through, in order. Each invocation is one
/// linear pass; there are no retries or backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleState {
    Resolved,
    Instantiated,
    Configured,
    Ran,
    Completed,
    Failed,
}

/// Outcome of a completed invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// The plugin's return value, passed through unexamined.
    pub result: Value,
    /// States entered, ending in [`LifecycleState::Completed`].
    pub transitions: Vec<LifecycleState>,
}

/// Tracks the states entered by one invocation.
#[derive(Debug)]
pub(crate) struct Lifecycle<'a> {
    service_id: &'a str,
    plugin_id: &'a str,
    transitions: Vec<LifecycleState>,
}

impl<'a> Lifecycle<'a> {
    pub(crate) fn new(service_id: &'a str, plugin_id: &'a str) -> Self {
        Self {
            service_id,
            plugin_id,
            transitions: Vec::with_capacity(5),
        }
    }

    pub(crate) fn enter(&mut self, state: LifecycleState) {
        debug!(
            service_id = self.service_id,
            plugin_id = self.plugin_id,
            %state,
            "lifecycle transition"
        );
        self.transitions.push(state);
    }

    pub(crate) fn current(&self) -> Option<LifecycleState> {
        self.transitions.last().copied()
    }

    pub(crate) fn complete(mut self, result: Value) -> ExecutionReport {
        self.enter(LifecycleState::Completed);
        ExecutionReport {
            result,
            transitions: self.transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completed_report_lists_every_state() {
        let mut lifecycle = Lifecycle::new("s", "p");
        lifecycle.enter(LifecycleState::Resolved);
        lifecycle.enter(LifecycleState::Instantiated);
        assert_eq!(lifecycle.current(), Some(LifecycleState::Instantiated));
        lifecycle.enter(LifecycleState::Configured);
        lifecycle.enter(LifecycleState::Ran);

        let report = lifecycle.complete(json!({"ok": true}));
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
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["transitions"][4], "completed");
    }
}
