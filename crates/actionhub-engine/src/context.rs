// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the restricted context view handed to a plugin instance.

use actionhub_core::types::{CLASS_NAME_KEY, MODULE_KEY, NODE_KEY};
use actionhub_core::{PluginContext, PluginIdentity};
use serde_json::{Map, Value};
use tracing::debug;

/// Context keys copied to plugins when nothing else is configured.
pub const DEFAULT_CONTEXT_ALLOWLIST: &[&str] = &[NODE_KEY];

/// Copy the allow-listed keys of `context` and stamp the plugin identity.
///
/// The `node` entry always exists in the result: the engine owns its
/// `className` and `module` keys and overwrites whatever the caller sent.
/// Every other caller key outside `allowlist` is dropped.
pub fn plugin_context(
    context: &Map<String, Value>,
    allowlist: &[String],
    identity: &PluginIdentity,
) -> PluginContext {
    let mut visible: Map<String, Value> = allowlist
        .iter()
        .filter_map(|key| context.get(key).map(|v| (key.clone(), v.clone())))
        .collect();

    let dropped = context.keys().filter(|k| !visible.contains_key(*k)).count();
    if dropped > 0 {
        debug!(dropped, "context keys outside the allowlist withheld from plugin");
    }

    let node = visible
        .entry(NODE_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(node) = node {
        node.insert(
            CLASS_NAME_KEY.to_string(),
            Value::String(identity.class_name.clone()),
        );
        node.insert(
            MODULE_KEY.to_string(),
            Value::String(identity.module.clone()),
        );
    }

    PluginContext::new(visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> PluginIdentity {
        PluginIdentity::new("CardAdder", "plugins::trello")
    }

    fn allow(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn only_allowlisted_keys_are_visible() {
        let context = json!({
            "node": {"id": "n-1"},
            "session": {"secret": "s"},
            "profile": {"email": "x@example.com"}
        });
        let ctx = plugin_context(context.as_object().unwrap(), &allow(&["node"]), &identity());
        assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["node"]);
        assert_eq!(ctx.node().unwrap()["id"], "n-1");
    }

    #[test]
    fn identity_overwrites_caller_supplied_reserved_keys() {
        let context = json!({"node": {"className": "Spoofed", "module": "evil"}});
        let ctx = plugin_context(context.as_object().unwrap(), &allow(&["node"]), &identity());
        assert_eq!(ctx.class_name(), Some("CardAdder"));
        assert_eq!(ctx.module(), Some("plugins::trello"));
    }

    #[test]
    fn node_is_created_when_missing_or_malformed() {
        let empty = Map::new();
        let ctx = plugin_context(&empty, &allow(&["node"]), &identity());
        assert_eq!(ctx.class_name(), Some("CardAdder"));

        let context = json!({"node": "not-an-object"});
        let ctx = plugin_context(context.as_object().unwrap(), &allow(&["node"]), &identity());
        assert_eq!(ctx.module(), Some("plugins::trello"));
    }

    #[test]
    fn extra_allowlisted_keys_pass_through() {
        let context = json!({"node": {}, "flow": {"id": "f"}, "event": {}});
        let ctx = plugin_context(
            context.as_object().unwrap(),
            &allow(&["node", "flow"]),
            &identity(),
        );
        let mut keys: Vec<_> = ctx.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["flow", "node"]);
    }
}
