//! Exported JSON Schema checked with the `jsonschema` validator

use serde_json::{json, Value};

use token_schemas::SchemaCatalog;

fn screen() -> Value {
    serde_json::from_str(include_str!("fixtures/screen_v1.json")).unwrap()
}

#[test]
fn test_exported_schema_compiles() {
    assert!(SchemaCatalog::standard().compile_json_schema().is_ok());
}

#[test]
fn test_fixture_screen_is_valid() {
    let compiled = SchemaCatalog::standard().compile_json_schema().unwrap();
    assert!(compiled.is_valid(&screen()));
}

#[test]
fn test_bad_enum_in_nested_child_is_invalid() {
    let compiled = SchemaCatalog::standard().compile_json_schema().unwrap();
    let mut screen = screen();
    screen["children"][3]["children"][0]["contentScale"] = json!("Stretch");
    assert!(!compiled.is_valid(&screen));
}

#[test]
fn test_discriminator_is_required() {
    let compiled = SchemaCatalog::standard().compile_json_schema().unwrap();
    let divider = json!({ "id": "d", "version": "1.0.0", "thickness": 1 });
    assert!(!compiled.is_valid(&divider));

    let tagged = json!({ "type": "DividerToken", "id": "d", "version": 1, "thickness": 1 });
    assert!(compiled.is_valid(&tagged));
}

#[test]
fn test_semantic_rules_are_not_exported() {
    let compiled = SchemaCatalog::standard().compile_json_schema().unwrap();
    let slider = json!({
        "type": "SliderToken",
        "id": "s",
        "version": "1.0.0",
        "initialValue": 5.0,
        "rangeStart": 0.0,
        "rangeEnd": 1.0
    });
    assert!(compiled.is_valid(&slider));
}
