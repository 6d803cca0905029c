//! Token Validation
//!
//! Structural checks (required presence, JSON kinds, enum membership, duplicate
//! ids) run first for a node, then semantic checks (ranges and cross-field
//! rules), then the node's nested tokens. Nothing short-circuits: every
//! violated rule on every field yields its own error, in check order.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::infer::{self, DISCRIMINATOR};
use crate::schema::{FieldKind, FieldSpec, ObjectSchema, SchemaCatalog, SemanticRule, COLOR_VALUE};
use crate::token::document::ANONYMOUS_ID;
use crate::token::{ActionType, ColorValue, TokenTree};
use crate::version::SemanticVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationKind {
    /// Missing, mistyped or out-of-enum field
    Structural,
    /// Range or cross-field rule violated
    Semantic,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationKind::Structural => write!(f, "structural"),
            ValidationKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// One violated rule on one field
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{kind} error in {token_id} at {field}: {message}")]
pub struct ValidationError {
    pub token_id: String,
    /// Dotted path below the token, e.g. `style.color.red`
    pub field: String,
    pub kind: ValidationKind,
    pub message: String,
}

impl ValidationError {
    fn structural(token_id: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            token_id: token_id.to_string(),
            field: field.to_string(),
            kind: ValidationKind::Structural,
            message: message.into(),
        }
    }

    fn semantic(token_id: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            token_id: token_id.to_string(),
            field: field.to_string(),
            kind: ValidationKind::Semantic,
            message: message.into(),
        }
    }
}

/// Validate a whole tree with the standard catalog
pub fn validate<T: TokenTree>(tree: &T) -> Vec<ValidationError> {
    Validator::new().validate(tree)
}

/// Validate a standalone color, reporting under `token_id` / `field`
pub fn validate_color(token_id: &str, field: &str, color: &ColorValue) -> Vec<ValidationError> {
    let value = serde_json::to_value(color).unwrap_or_default();
    Validator::new().validate_object(token_id, field, &COLOR_VALUE, &value)
}

pub struct Validator {
    catalog: &'static SchemaCatalog,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            catalog: SchemaCatalog::standard(),
        }
    }

    pub fn validate<T: TokenTree>(&self, tree: &T) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();
        self.validate_node(&tree.to_value(), &mut seen_ids, &mut errors);
        errors
    }

    /// Structural then semantic checks for a nested value object
    pub fn validate_object(
        &self,
        token_id: &str,
        field: &str,
        schema: &ObjectSchema,
        value: &Value,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let Some(object) = value.as_object() else {
            errors.push(ValidationError::structural(
                token_id,
                field,
                format!("expected {} object", schema.name),
            ));
            return errors;
        };
        check_fields(token_id, field, schema.fields.iter(), object, &mut errors);
        check_object_semantics(token_id, field, schema, object, &mut errors);
        errors
    }

    fn validate_node(&self, node: &Value, seen_ids: &mut HashSet<String>, errors: &mut Vec<ValidationError>) {
        let token_id = node
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(ANONYMOUS_ID)
            .to_string();

        let Some(object) = node.as_object() else {
            errors.push(ValidationError::structural(&token_id, "", "token must be a JSON object"));
            return;
        };

        if let Some(id) = object.get("id").and_then(Value::as_str) {
            if !seen_ids.insert(id.to_string()) {
                errors.push(ValidationError::structural(
                    &token_id,
                    "id",
                    format!("duplicate id '{id}' in tree"),
                ));
            }
        }

        let variant = infer::infer_component(node).and_then(|i| self.catalog.variant(i.kind));
        let Some(variant) = variant else {
            errors.push(ValidationError::structural(
                &token_id,
                DISCRIMINATOR,
                "could not resolve component type",
            ));
            if let Some(children) = object.get("children").and_then(Value::as_array) {
                for child in children {
                    self.validate_node(child, seen_ids, errors);
                }
            }
            return;
        };

        // structural
        let fields = self
            .catalog
            .common_fields()
            .iter()
            .filter(|f| f.name != DISCRIMINATOR)
            .chain(variant.fields.iter());
        check_fields(&token_id, "", fields, object, errors);

        // semantic
        check_version_floor(&token_id, object, errors);
        for rule in variant.rules {
            check_rule(&token_id, "", rule, object, errors);
        }
        let nested = self.catalog.common_fields().iter().chain(variant.fields.iter());
        for spec in nested {
            if let (FieldKind::Object(schema), Some(Value::Object(inner))) = (&spec.kind, object.get(spec.name)) {
                check_object_semantics(&token_id, spec.name, schema, inner, errors);
            }
        }

        // nested tokens
        for spec in variant.fields {
            match (&spec.kind, object.get(spec.name)) {
                (FieldKind::Token, Some(child @ Value::Object(_))) => {
                    self.validate_node(child, seen_ids, errors);
                }
                (FieldKind::TokenList, Some(Value::Array(children))) => {
                    for child in children {
                        self.validate_node(child, seen_ids, errors);
                    }
                }
                _ => {}
            }
        }
    }
}

// =============================================================================
// Structural Checks
// =============================================================================

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_fields<'a>(
    token_id: &str,
    prefix: &str,
    fields: impl Iterator<Item = &'a FieldSpec>,
    object: &Map<String, Value>,
    errors: &mut Vec<ValidationError>,
) {
    for spec in fields {
        let path = join(prefix, spec.name);
        match object.get(spec.name).filter(|v| !v.is_null()) {
            None if spec.required => {
                errors.push(ValidationError::structural(token_id, &path, "missing required field"));
            }
            None => {}
            Some(value) => check_kind(token_id, &path, &spec.kind, value, errors),
        }
    }
}

fn check_kind(token_id: &str, path: &str, kind: &FieldKind, value: &Value, errors: &mut Vec<ValidationError>) {
    let mismatch = |errors: &mut Vec<ValidationError>| {
        errors.push(ValidationError::structural(
            token_id,
            path,
            format!("expected {}, got {}", kind.describe(), json_type(value)),
        ));
    };

    match kind {
        FieldKind::String if !value.is_string() => mismatch(errors),
        FieldKind::Number if !value.is_number() => mismatch(errors),
        FieldKind::Integer if !(value.is_i64() || value.is_u64()) => mismatch(errors),
        FieldKind::Boolean if !value.is_boolean() => mismatch(errors),
        FieldKind::Token if !value.is_object() => mismatch(errors),
        FieldKind::TokenList if !value.is_array() => mismatch(errors),
        FieldKind::Version => {
            if let Err(e) = serde_json::from_value::<SemanticVersion>(value.clone()) {
                errors.push(ValidationError::structural(token_id, path, format!("invalid version: {e}")));
            }
        }
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            Some(s) => errors.push(ValidationError::structural(
                token_id,
                path,
                format!("'{s}' is not one of {}", allowed.join(", ")),
            )),
            None => mismatch(errors),
        },
        FieldKind::Object(schema) => match value.as_object() {
            Some(inner) => check_fields(token_id, path, schema.fields.iter(), inner, errors),
            None => mismatch(errors),
        },
        FieldKind::StringMap => match value.as_object() {
            Some(entries) => {
                for (key, entry) in entries {
                    if !entry.is_string() {
                        errors.push(ValidationError::structural(
                            token_id,
                            &join(path, key),
                            format!("expected string, got {}", json_type(entry)),
                        ));
                    }
                }
            }
            None => mismatch(errors),
        },
        _ => {}
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Semantic Checks
// =============================================================================

/// `minSupportedVersion <= version`, when both parse
fn check_version_floor(token_id: &str, object: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    let read = |name: &str| {
        object
            .get(name)
            .and_then(|v| serde_json::from_value::<SemanticVersion>(v.clone()).ok())
    };
    if let (Some(version), Some(floor)) = (read("version"), read("minSupportedVersion")) {
        if floor > version {
            errors.push(ValidationError::semantic(
                token_id,
                "minSupportedVersion",
                format!("minimum supported version {floor} is newer than version {version}"),
            ));
        }
    }
}

/// Rules of a value object and of the value objects nested in it
fn check_object_semantics(
    token_id: &str,
    prefix: &str,
    schema: &ObjectSchema,
    object: &Map<String, Value>,
    errors: &mut Vec<ValidationError>,
) {
    for rule in schema.rules {
        check_rule(token_id, prefix, rule, object, errors);
    }
    for spec in schema.fields {
        if let (FieldKind::Object(inner_schema), Some(Value::Object(inner))) = (&spec.kind, object.get(spec.name)) {
            check_object_semantics(token_id, &join(prefix, spec.name), inner_schema, inner, errors);
        }
    }
}

const COLOR_CHANNELS: [&str; 4] = ["red", "green", "blue", "alpha"];

fn check_rule(
    token_id: &str,
    prefix: &str,
    rule: &SemanticRule,
    object: &Map<String, Value>,
    errors: &mut Vec<ValidationError>,
) {
    let number = |name: &str| object.get(name).and_then(Value::as_f64);

    match *rule {
        SemanticRule::ColorChannels => {
            for channel in COLOR_CHANNELS {
                let Some(raw) = object.get(channel).filter(|v| v.is_i64() || v.is_u64()) else {
                    continue;
                };
                // integers past i64::MAX are out of range too
                let in_range = raw.as_i64().is_some_and(|n| (0..=255).contains(&n));
                if !in_range {
                    errors.push(ValidationError::semantic(
                        token_id,
                        &join(prefix, channel),
                        format!("{channel} channel {raw} outside [0, 255]"),
                    ));
                }
            }
        }
        SemanticRule::WithinRange { value, start, end } => {
            let (Some(v), Some(lo), Some(hi)) = (number(value), number(start), number(end)) else {
                return;
            };
            if lo > hi {
                errors.push(ValidationError::semantic(
                    token_id,
                    &join(prefix, end),
                    format!("range end {hi} is before range start {lo}"),
                ));
            } else if v < lo || v > hi {
                errors.push(ValidationError::semantic(
                    token_id,
                    &join(prefix, value),
                    format!("{v} outside [{lo}, {hi}]"),
                ));
            }
        }
        SemanticRule::ActionData => {
            let Some(action_type) = object.get("type").and_then(Value::as_str).and_then(ActionType::from_name)
            else {
                return;
            };
            let data = object.get("data").and_then(Value::as_object);
            for key in action_type.required_data_keys() {
                if !data.is_some_and(|d| d.contains_key(*key)) {
                    errors.push(ValidationError::semantic(
                        token_id,
                        &join(prefix, &format!("data.{key}")),
                        format!("{action_type:?} action requires data key '{key}'"),
                    ));
                }
            }
        }
        SemanticRule::NonNegative(field) => {
            if let Some(n) = number(field) {
                if n < 0.0 {
                    errors.push(ValidationError::semantic(
                        token_id,
                        &join(prefix, field),
                        format!("{field} must not be negative, got {n}"),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::token::TokenDocument;

    fn doc(value: Value) -> TokenDocument {
        TokenDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_text_has_no_errors() {
        let errors = validate(&doc(json!({
            "type": "TextToken",
            "id": "t",
            "version": "1.0.0",
            "text": "ok",
            "style": { "fontSize": 14, "color": { "red": 0, "green": 0, "blue": 0, "alpha": 255 } }
        })));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_color_channels_reported_individually() {
        let errors = validate_color("swatch", "color", &ColorValue::new(300, -50, 0, 500));
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["color.red", "color.green", "color.alpha"]);
        assert!(errors.iter().all(|e| e.kind == ValidationKind::Semantic));
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let errors = validate(&doc(json!({
            "type": "ButtonToken",
            "id": "b",
            "version": "1.0.0",
            "onClick": { "type": "Teleport", "data": { "target": 3 } }
        })));
        let summary: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("text", ValidationKind::Structural),
                ("onClick.type", ValidationKind::Structural),
                ("onClick.data.target", ValidationKind::Structural),
            ]
        );
    }

    #[test]
    fn test_action_data_keys() {
        let errors = validate(&doc(json!({
            "type": "ButtonToken",
            "id": "b",
            "version": "1.0.0",
            "text": "Open",
            "onClick": { "type": "OpenUrl", "data": { "target": "home" } }
        })));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "onClick.data.url");
        assert_eq!(errors[0].kind, ValidationKind::Semantic);
    }

    #[test]
    fn test_version_floor_above_version() {
        let errors = validate(&doc(json!({
            "type": "DividerToken",
            "id": "d",
            "version": "1.0.0",
            "minSupportedVersion": "1.2.0",
            "thickness": 1
        })));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "minSupportedVersion");
    }

    #[test]
    fn test_inverted_range() {
        let errors = validate(&doc(json!({
            "type": "SliderToken",
            "id": "s",
            "version": "1.0.0",
            "initialValue": 0.5,
            "rangeStart": 1.0,
            "rangeEnd": 0.0
        })));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rangeEnd");
    }

    #[test]
    fn test_display() {
        let err = ValidationError::semantic("s", "initialValue", "5 outside [0, 1]");
        assert_eq!(err.to_string(), "semantic error in s at initialValue: 5 outside [0, 1]");
    }
}
