//! JSON Schema export
//!
//! Renders the catalog as a draft-07 JSON Schema document for external
//! validators. This is a derived, read-only view: it carries field names,
//! required-ness, JSON kinds and enum sets, but not semantic rules. The export
//! describes the canonical wire form, so the `type` discriminator is required.

use serde_json::{json, Map, Value};

use super::{FieldKind, FieldSpec, ObjectSchema, SchemaCatalog};
use crate::error::{Error, Result};

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

impl SchemaCatalog {
    /// Render the catalog as a JSON Schema document
    pub fn to_json_schema(&self) -> Value {
        let mut definitions = Map::new();

        for object in self.object_schemas() {
            definitions.insert(object.name.to_string(), object_definition(object));
        }

        let mut variant_refs = Vec::with_capacity(self.variants().len());
        for variant in self.variants() {
            let id = variant.kind.as_str();
            let fields = self
                .common_fields()
                .iter()
                .filter(|f| f.name != "type")
                .chain(variant.fields.iter());

            let mut definition = fields_definition(fields);
            definition["properties"]["type"] = json!({ "const": id });
            if let Some(required) = definition["required"].as_array_mut() {
                required.insert(0, json!("type"));
            }

            definitions.insert(id.to_string(), definition);
            variant_refs.push(json!({ "$ref": format!("#/definitions/{id}") }));
        }

        definitions.insert("Token".to_string(), json!({ "oneOf": variant_refs.clone() }));

        json!({
            "$schema": DRAFT_07,
            "title": "Token",
            "oneOf": variant_refs,
            "definitions": definitions,
        })
    }

    /// Compile the exported schema with the `jsonschema` validator
    pub fn compile_json_schema(&self) -> Result<jsonschema::JSONSchema> {
        let schema = self.to_json_schema();
        jsonschema::JSONSchema::compile(&schema).map_err(|e| Error::SchemaExport(e.to_string()))
    }
}

fn object_definition(object: &ObjectSchema) -> Value {
    let mut definition = fields_definition(object.fields.iter());
    definition["title"] = json!(object.name);
    definition
}

fn fields_definition<'a>(fields: impl Iterator<Item = &'a FieldSpec>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        properties.insert(field.name.to_string(), kind_schema(&field.kind));
        if field.required {
            required.push(json!(field.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn kind_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::Integer => json!({ "type": "integer" }),
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Version => json!({
            "oneOf": [
                { "type": "string", "pattern": "^v?\\d+(\\.\\d+\\.\\d+)?$" },
                { "type": "integer", "minimum": 0 }
            ]
        }),
        FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldKind::Object(object) => json!({ "$ref": format!("#/definitions/{}", object.name) }),
        FieldKind::StringMap => json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        }),
        FieldKind::Token => json!({ "$ref": "#/definitions/Token" }),
        FieldKind::TokenList => json!({
            "type": "array",
            "items": { "$ref": "#/definitions/Token" }
        }),
    }
}
