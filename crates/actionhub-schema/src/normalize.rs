// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts `jsonschema` validation errors into stable [`FieldError`] records.
//!
//! Paths are rendered as dotted/bracketed locators into the payload
//! (`address.city`, `items[2].sku`). Errors reported against a parent object
//! for a missing or unexpected child (`required`, `additionalProperties`) are
//! re-anchored on the child itself.

use actionhub_core::{ErrorCode, FieldError};
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;

/// Normalize validator-native errors into an ordered, de-duplicated list.
///
/// The result is sorted by path (stable, so errors on the same path keep the
/// validator's order), which keeps repeated validations byte-identical. Array
/// indices compare numerically, so `items[2]` sorts before `items[10]`.
pub fn normalize_errors<'a>(
    errors: impl IntoIterator<Item = ValidationError<'a>>,
    payload: &Value,
) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = Vec::new();

    for error in errors {
        let base = pointer_to_path(&error.instance_path.to_string(), payload);
        for field in convert(&error, &base) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }

    fields.sort_by(|a, b| path_segments(&a.path).cmp(&path_segments(&b.path)));
    fields
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    Index(usize),
    Key(&'a str),
}

/// Split a rendered locator back into its keys and indices.
fn path_segments(path: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = path;

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix("[\"") {
            let end = quoted.find("\"]").unwrap_or(quoted.len());
            segments.push(Segment::Key(&quoted[..end]));
            rest = quoted.get(end + 2..).unwrap_or("");
        } else if let Some(bracketed) = rest.strip_prefix('[') {
            let end = bracketed.find(']').unwrap_or(bracketed.len());
            let raw = &bracketed[..end];
            segments.push(raw.parse().map_or(Segment::Key(raw), Segment::Index));
            rest = bracketed.get(end + 1..).unwrap_or("");
        } else if let Some(after_dot) = rest.strip_prefix('.') {
            rest = after_dot;
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            segments.push(Segment::Key(&rest[..end]));
            rest = &rest[end..];
        }
    }

    segments
}

fn convert(error: &ValidationError<'_>, base: &str) -> Vec<FieldError> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            vec![FieldError::new(
                child_path(base, &name),
                "field required",
                ErrorCode::Required,
            )]
        }
        ValidationErrorKind::AdditionalProperties { unexpected }
        | ValidationErrorKind::UnevaluatedProperties { unexpected } => unexpected
            .iter()
            .map(|name| {
                FieldError::new(
                    child_path(base, name),
                    "extra fields not permitted",
                    ErrorCode::UnknownField,
                )
            })
            .collect(),
        kind => vec![FieldError::new(base, error.to_string(), code_for(kind))],
    }
}

fn code_for(kind: &ValidationErrorKind) -> ErrorCode {
    match kind {
        ValidationErrorKind::Type { .. } => ErrorCode::Type,
        ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => ErrorCode::Enum,
        ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::ExclusiveMinimum { .. }
        | ValidationErrorKind::ExclusiveMaximum { .. }
        | ValidationErrorKind::MultipleOf { .. } => ErrorCode::Range,
        ValidationErrorKind::MinLength { .. }
        | ValidationErrorKind::MaxLength { .. }
        | ValidationErrorKind::MinItems { .. }
        | ValidationErrorKind::MaxItems { .. }
        | ValidationErrorKind::MinProperties { .. }
        | ValidationErrorKind::MaxProperties { .. } => ErrorCode::Length,
        ValidationErrorKind::Pattern { .. } => ErrorCode::Pattern,
        ValidationErrorKind::Format { .. } => ErrorCode::Format,
        _ => ErrorCode::Constraint,
    }
}

/// Render a JSON pointer (`/items/2/sku`) as a payload locator (`items[2].sku`).
///
/// The payload disambiguates numeric segments: they become `[n]` only where
/// the value being indexed is an array. Keys that contain `.` or `[` are
/// rendered in quoted brackets.
pub fn pointer_to_path(pointer: &str, payload: &Value) -> String {
    let mut path = String::new();
    let mut current = Some(payload);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        match (current, segment.parse::<usize>()) {
            (Some(Value::Array(items)), Ok(index)) => {
                path.push_str(&format!("[{index}]"));
                current = items.get(index);
            }
            _ => {
                path = child_path(&path, &segment);
                current = current.and_then(|v| v.get(&segment));
            }
        }
    }

    path
}

fn child_path(base: &str, key: &str) -> String {
    if key.contains('.') || key.contains('[') {
        format!("{base}[\"{key}\"]")
    } else if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_renders_nested_object_paths() {
        let payload = json!({"address": {"city": 1}});
        assert_eq!(pointer_to_path("/address/city", &payload), "address.city");
    }

    #[test]
    fn pointer_renders_array_indices_in_brackets() {
        let payload = json!({"items": [{}, {}, {"sku": 1}]});
        assert_eq!(pointer_to_path("/items/2/sku", &payload), "items[2].sku");
    }

    #[test]
    fn numeric_object_keys_stay_dotted() {
        let payload = json!({"years": {"2024": "x"}});
        assert_eq!(pointer_to_path("/years/2024", &payload), "years.2024");
    }

    #[test]
    fn root_pointer_is_empty_path() {
        assert_eq!(pointer_to_path("", &json!(1)), "");
    }

    #[test]
    fn escaped_pointer_segments_are_unescaped() {
        let payload = json!({"a/b": {"c~d": 1}});
        assert_eq!(pointer_to_path("/a~1b/c~0d", &payload), "a/b.c~d");
    }

    #[test]
    fn dotted_keys_are_quoted() {
        let payload = json!({"event@v1.0": 1});
        assert_eq!(pointer_to_path("/event@v1.0", &payload), "[\"event@v1.0\"]");
    }

    #[test]
    fn required_errors_anchor_on_missing_field() {
        let schema = json!({
            "type": "object",
            "properties": {"address": {
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"]
            }},
            "required": ["address"]
        });
        let payload = json!({"address": {}});
        let validator = jsonschema::validator_for(&schema).unwrap();
        let errors = normalize_errors(validator.iter_errors(&payload), &payload);
        assert_eq!(
            errors,
            vec![FieldError::new("address.city", "field required", ErrorCode::Required)]
        );
    }

    #[test]
    fn additional_properties_yield_one_error_per_key() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {}},
            "additionalProperties": false
        });
        let payload = json!({"a": 1, "zz": 2, "b": 3});
        let validator = jsonschema::validator_for(&schema).unwrap();
        let errors = normalize_errors(validator.iter_errors(&payload), &payload);
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["b", "zz"]);
        assert!(errors.iter().all(|e| e.code == ErrorCode::UnknownField));
    }

    #[test]
    fn array_indices_sort_numerically() {
        let schema = json!({
            "type": "object",
            "properties": {
                "items": {"type": "array", "items": {"type": "integer"}}
            }
        });
        let mut items = vec![json!(0); 11];
        items[2] = json!("two");
        items[10] = json!("ten");
        let payload = json!({"items": items});
        let validator = jsonschema::validator_for(&schema).unwrap();
        let errors = normalize_errors(validator.iter_errors(&payload), &payload);
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["items[2]", "items[10]"]);
    }

    #[test]
    fn path_segments_split_keys_indices_and_quoted_keys() {
        assert_eq!(
            path_segments("items[10].sku[\"a.b\"]"),
            vec![
                Segment::Key("items"),
                Segment::Index(10),
                Segment::Key("sku"),
                Segment::Key("a.b"),
            ]
        );
        assert!(path_segments("").is_empty());
    }

    #[test]
    fn type_and_range_errors_map_to_codes() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "count": {"type": "integer", "minimum": 1},
                "tag": {"enum": ["a", "b"]}
            }
        });
        let payload = json!({"name": 5, "count": 0, "tag": "c"});
        let validator = jsonschema::validator_for(&schema).unwrap();
        let errors = normalize_errors(validator.iter_errors(&payload), &payload);

        let by_path = |p: &str| errors.iter().find(|e| e.path == p).map(|e| e.code);
        assert_eq!(by_path("name"), Some(ErrorCode::Type));
        assert_eq!(by_path("count"), Some(ErrorCode::Range));
        assert_eq!(by_path("tag"), Some(ErrorCode::Enum));
    }
}
