// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema preparation passes run before validation.
//!
//! [`apply_defaults`] fills absent properties from their declared `default`
//! values. [`forbid_unknown_fields`] closes every object schema that declares
//! `properties` but says nothing about extra keys.

use serde_json::{Map, Value};

/// Keywords whose value is a subschema validated against the same instance
/// as its parent, alongside the parent's own `properties`.
const IN_PLACE_KEYWORDS: &[&str] = &["not", "if", "then", "else"];

/// Keywords whose value is an array of in-place subschemas.
const IN_PLACE_ARRAY_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Keywords whose value is a subschema for a child instance.
const CHILD_KEYWORDS: &[&str] = &["items", "additionalProperties"];

/// Keywords whose value is an array of child-instance subschemas.
const CHILD_ARRAY_KEYWORDS: &[&str] = &["prefixItems"];

/// Keywords whose value is a map of name -> child-instance subschema.
const CHILD_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties"];

/// Keywords whose value is a map of named definitions, reached through `$ref`.
const DEFINITION_KEYWORDS: &[&str] = &["$defs", "definitions"];

/// Keywords that pull another schema's properties into a node.
const COMPOSITION_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "$ref", "then", "else"];

/// Maximum `$ref` hops followed while resolving a schema node.
const MAX_REF_DEPTH: usize = 32;

/// Close every object schema that does not say how to treat extra keys.
///
/// A plain node with `properties` gets `"additionalProperties": false`. A
/// node that composes other schemas gets `"unevaluatedProperties": false`
/// instead, so properties declared by its branches or `$ref` target are
/// still accepted; this only happens when something in the composition
/// declares `properties`. Composition branches and `$defs` entries are never
/// closed at their own level, only the objects nested inside them.
///
/// A node is left alone when it already declares `additionalProperties` or
/// `unevaluatedProperties`; that is how a schema marks itself permissive.
pub fn forbid_unknown_fields(schema: &mut Value) {
    let root = schema.clone();
    close(&root, schema, true);
}

fn close(root: &Value, schema: &mut Value, standalone: bool) {
    let Value::Object(node) = schema else {
        return;
    };

    let explicit = node.contains_key("additionalProperties") || node.contains_key("unevaluatedProperties");
    if standalone && !explicit {
        if COMPOSITION_KEYWORDS.iter().any(|k| node.contains_key(*k)) {
            if declares_properties(root, node, 0) {
                node.insert("unevaluatedProperties".to_string(), Value::Bool(false));
            }
        } else if node.contains_key("properties") {
            node.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }

    for keyword in IN_PLACE_KEYWORDS {
        if let Some(sub) = node.get_mut(*keyword) {
            close(root, sub, false);
        }
    }
    for keyword in IN_PLACE_ARRAY_KEYWORDS {
        if let Some(Value::Array(subs)) = node.get_mut(*keyword) {
            subs.iter_mut().for_each(|sub| close(root, sub, false));
        }
    }
    for keyword in DEFINITION_KEYWORDS {
        if let Some(Value::Object(subs)) = node.get_mut(*keyword) {
            subs.values_mut().for_each(|sub| close(root, sub, false));
        }
    }
    for keyword in CHILD_KEYWORDS {
        if let Some(sub) = node.get_mut(*keyword) {
            close(root, sub, true);
        }
    }
    for keyword in CHILD_ARRAY_KEYWORDS {
        if let Some(Value::Array(subs)) = node.get_mut(*keyword) {
            subs.iter_mut().for_each(|sub| close(root, sub, true));
        }
    }
    for keyword in CHILD_MAP_KEYWORDS {
        if let Some(Value::Object(subs)) = node.get_mut(*keyword) {
            subs.values_mut().for_each(|sub| close(root, sub, true));
        }
    }
}

/// Whether `node`, or anything it composes, declares `properties`.
///
/// A composition of free-form objects (`{"$ref": "#/$defs/AnyMap"}`) stays
/// open.
fn declares_properties(root: &Value, node: &Map<String, Value>, depth: usize) -> bool {
    if depth > MAX_REF_DEPTH {
        return false;
    }
    if node.contains_key("properties") {
        return true;
    }

    let referenced = node
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| reference.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer));
    let branches = IN_PLACE_ARRAY_KEYWORDS
        .iter()
        .filter_map(|k| node.get(*k))
        .filter_map(Value::as_array)
        .flatten();
    let conditional = ["then", "else"].iter().filter_map(|k| node.get(*k));

    referenced
        .into_iter()
        .chain(branches)
        .chain(conditional)
        .filter_map(Value::as_object)
        .any(|sub| declares_properties(root, sub, depth + 1))
}

/// Fill absent object properties with their schema `default`, recursively.
///
/// Local `$ref`s (`#/...`) are followed against `root`. Values that are
/// present are never overwritten, and nothing is inserted into non-objects.
pub fn apply_defaults(root: &Value, schema: &Value, payload: &mut Value) {
    let Some(node) = resolve(root, schema) else {
        return;
    };

    // allOf branches all apply, so their defaults do too.
    if let Some(Value::Array(branches)) = node.get("allOf") {
        for branch in branches {
            apply_defaults(root, branch, payload);
        }
    }

    match payload {
        Value::Object(fields) => {
            if let Some(Value::Object(properties)) = node.get("properties") {
                fill_properties(root, properties, fields);
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = node.get("items").filter(|s| s.is_object()) {
                for item in items.iter_mut() {
                    apply_defaults(root, item_schema, item);
                }
            }
        }
        _ => {}
    }
}

fn fill_properties(root: &Value, properties: &Map<String, Value>, fields: &mut Map<String, Value>) {
    for (name, prop_schema) in properties {
        match fields.get_mut(name) {
            Some(existing) => apply_defaults(root, prop_schema, existing),
            None => {
                let default = resolve(root, prop_schema).and_then(|n| n.get("default"));
                if let Some(default) = default {
                    let mut value = default.clone();
                    apply_defaults(root, prop_schema, &mut value);
                    fields.insert(name.clone(), value);
                }
            }
        }
    }
}

/// Follow local `$ref`s until reaching a schema object.
///
/// A node carrying its own `default` next to a `$ref` wins, which is how
/// schema generators annotate defaults on referenced struct types.
fn resolve<'a>(root: &'a Value, schema: &'a Value) -> Option<&'a Map<String, Value>> {
    let mut current = schema.as_object()?;
    for _ in 0..MAX_REF_DEPTH {
        if current.contains_key("default") {
            return Some(current);
        }
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return Some(current);
        };
        let pointer = reference.strip_prefix('#')?;
        current = root.pointer(pointer)?.as_object()?;
    }
    None
}
