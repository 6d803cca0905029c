//! Migration engine tests
//!
//! End-to-end behaviour of `Migrator` over typed tokens and documents.

use serde_json::{json, Value};

use token_schemas::migration::Migrator;
use token_schemas::registry::MigrationPath;
use token_schemas::{MigrationError, SemanticVersion, Token, TokenDocument, TokenTree, VersionRegistry};

fn v(major: u64, minor: u64, patch: u64) -> SemanticVersion {
    SemanticVersion::new(major, minor, patch)
}

fn screen() -> Token {
    serde_json::from_str(include_str!("fixtures/screen_v1.json")).unwrap()
}

fn legacy_screen() -> TokenDocument {
    TokenDocument::parse(include_str!("fixtures/legacy_screen.json")).unwrap()
}

fn child_ids(value: &Value) -> Vec<&str> {
    value["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Default Rule
// =============================================================================

#[test]
fn test_identity_when_already_at_target() {
    let registry = VersionRegistry::new();
    let token = screen();
    let migrated = Migrator::new(&registry).migrate(&token, &v(1, 0, 0)).unwrap();
    assert_eq!(migrated, token);
}

#[test]
fn test_upgrade_stamps_every_node() {
    let registry = VersionRegistry::new();
    let token = screen();
    let migrated = Migrator::new(&registry).migrate(&token, &v(1, 2, 0)).unwrap();
    let value = migrated.to_value();

    assert_eq!(value["version"], "1.2.0");
    assert_eq!(child_ids(&value), vec!["title", "cta", "gap", "feed"]);
    for child in value["children"].as_array().unwrap() {
        assert_eq!(child["version"], "1.2.0", "{}", child["id"]);
    }
    assert_eq!(value["children"][3]["placeholder"]["version"], "1.2.0");
    assert_eq!(value["children"][3]["children"][1]["version"], "1.2.0");

    // input untouched
    assert_eq!(token.meta().version, v(1, 0, 0));
}

#[test]
fn test_downgrade_is_rejected() {
    let registry = VersionRegistry::new();
    let err = Migrator::new(&registry).migrate(&screen(), &v(0, 9, 0)).unwrap_err();
    assert_eq!(
        err,
        MigrationError::DowngradeNotSupported {
            token_id: "screen".to_string(),
            from: v(1, 0, 0),
            to: v(0, 9, 0),
        }
    );
    assert!(err.is_recoverable());
}

#[test]
fn test_text_token_minor_bump_without_transform() {
    let mut registry = VersionRegistry::new();
    registry.register_version("TextToken", v(1, 1, 0));
    registry.register_migration_path("TextToken", v(1, 0, 0), v(1, 1, 0), MigrationPath::new("style defaults"));

    let token: Token = serde_json::from_value(json!({
        "type": "TextToken",
        "id": "greeting",
        "version": "1.0.0",
        "text": "Hello",
        "style": { "fontSize": 16.0, "fontWeight": "Medium" },
        "maxLines": 3
    }))
    .unwrap();

    let migrated = Migrator::new(&registry).migrate(&token, &v(1, 1, 0)).unwrap();

    let mut before = token.to_value();
    let mut after = migrated.to_value();
    assert_eq!(after["version"], "1.1.0");
    before.as_object_mut().unwrap().remove("version");
    after.as_object_mut().unwrap().remove("version");
    assert_eq!(
        serde_json::to_vec(&before).unwrap(),
        serde_json::to_vec(&after).unwrap()
    );
}

// =============================================================================
// Custom Transformations
// =============================================================================

#[test]
fn test_whole_token_transform_replaces_default_rule() {
    let mut registry = VersionRegistry::new();
    registry.register_migration_path(
        "ButtonToken",
        v(1, 0, 0),
        v(2, 0, 0),
        MigrationPath::new("rename label")
            .breaking()
            .with_token_transform(|mut value| {
                let text = value["text"].as_str().unwrap_or_default().to_uppercase();
                value["text"] = json!(text);
                Ok(value)
            }),
    );

    let token = TokenDocument::from_value(json!({
        "type": "ButtonToken",
        "id": "b",
        "version": "1.0.0",
        "text": "go",
        "onClick": { "type": "Dismiss" }
    }))
    .unwrap();

    let migrated = Migrator::new(&registry).migrate(&token, &v(2, 0, 0)).unwrap();
    assert_eq!(migrated.get("text"), Some(&json!("GO")));
    assert_eq!(migrated.get("version"), Some(&json!("2.0.0")));
}

#[test]
fn test_field_transform_keeps_default_rule() {
    let mut registry = VersionRegistry::new();
    registry.register_migration_path(
        "ColumnToken",
        v(1, 0, 0),
        v(1, 1, 0),
        MigrationPath::new("center everything").with_field_transform("alignment", |_| Ok(json!("Center"))),
    );

    let token: Token = serde_json::from_value(json!({
        "type": "ColumnToken",
        "id": "col",
        "version": "1.0.0",
        "alignment": "Start",
        "children": [{ "type": "SpacerToken", "id": "s", "version": "1.0.0", "width": 4.0 }]
    }))
    .unwrap();

    let value = Migrator::new(&registry).migrate(&token, &v(1, 1, 0)).unwrap().to_value();
    assert_eq!(value["alignment"], "Center");
    assert_eq!(value["children"][0]["version"], "1.1.0");
}

#[test]
fn test_field_callback_receives_target() {
    let mut registry = VersionRegistry::new();
    registry.register_field_migration("SliderToken", "steps", |old, target| {
        let steps = old.as_u64().unwrap_or(0);
        Ok(json!(steps * (target.minor + 1)))
    });

    let token: Token = serde_json::from_value(json!({
        "type": "SliderToken",
        "id": "s",
        "version": "1.0.0",
        "initialValue": 0.0,
        "rangeStart": 0.0,
        "rangeEnd": 1.0,
        "steps": 5
    }))
    .unwrap();

    let value = Migrator::new(&registry).migrate(&token, &v(1, 1, 0)).unwrap().to_value();
    assert_eq!(value["steps"], 10);
}

#[test]
fn test_failing_callback_is_custom_failure() {
    let mut registry = VersionRegistry::new();
    registry.register_field_migration("TextToken", "text", |_, _| anyhow::bail!("lookup table missing"));

    let token: Token = serde_json::from_value(json!({
        "type": "TextToken",
        "id": "t",
        "version": "1.0.0",
        "text": "x",
        "style": { "fontSize": 10.0 }
    }))
    .unwrap();

    let err = Migrator::new(&registry).migrate(&token, &v(1, 1, 0)).unwrap_err();
    match &err {
        MigrationError::CustomMigrationFailure { component_id, field, reason } => {
            assert_eq!(component_id, "TextToken");
            assert_eq!(field.as_deref(), Some("text"));
            assert!(reason.contains("lookup table missing"));
        }
        other => panic!("expected CustomMigrationFailure, got {other:?}"),
    }
    assert!(!err.is_recoverable());
}

// =============================================================================
// Lossy Children
// =============================================================================

#[test]
fn test_failed_children_are_dropped_in_order() {
    let mut registry = VersionRegistry::new();
    registry.register_field_migration("SpacerToken", "width", |_, _| anyhow::bail!("no"));

    let token: Token = serde_json::from_value(json!({
        "type": "RowToken",
        "id": "row",
        "version": "1.0.0",
        "children": [
            { "type": "DividerToken", "id": "a", "version": "1.0.0", "thickness": 1.0 },
            { "type": "SpacerToken", "id": "b", "version": "1.0.0", "width": 2.0 },
            { "type": "DividerToken", "id": "c", "version": "1.0.0", "thickness": 1.0 },
            { "type": "DividerToken", "id": "d", "version": "2.0.0", "thickness": 1.0 }
        ]
    }))
    .unwrap();

    let (migrated, report) = Migrator::new(&registry)
        .migrate_with_report(&token, &v(1, 5, 0))
        .unwrap();

    assert_eq!(child_ids(&migrated.to_value()), vec!["a", "c"]);
    assert!(!report.is_lossless());
    let dropped: Vec<_> = report.dropped.iter().map(|d| d.token_id.as_str()).collect();
    assert_eq!(dropped, vec!["b", "d"]);
    assert!(report.dropped.iter().all(|d| d.parent_id == "row" && d.field == "children"));
    assert!(matches!(report.dropped[1].error, MigrationError::DowngradeNotSupported { .. }));
}

#[test]
fn test_legacy_documents_infer_and_drop_unresolved() {
    let registry = VersionRegistry::new();
    let (migrated, report) = Migrator::new(&registry)
        .migrate_with_report(&legacy_screen(), &v(1, 1, 0))
        .unwrap();
    let value = migrated.into_value();

    assert_eq!(value["version"], "1.1.0");
    assert_eq!(child_ids(&value), vec!["headline", "go", "strip"]);
    assert_eq!(value["children"][2]["children"][0]["version"], "1.1.0");
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(
        report.dropped[0].error,
        MigrationError::UnresolvedType { token_id: "mystery".to_string() }
    );
}

#[test]
fn test_unresolved_root_fails() {
    let registry = VersionRegistry::new();
    let doc = TokenDocument::from_value(json!({ "id": "odd", "version": "1.0.0", "label": "?" })).unwrap();
    let err = Migrator::new(&registry).migrate(&doc, &v(1, 1, 0)).unwrap_err();
    assert_eq!(err, MigrationError::UnresolvedType { token_id: "odd".to_string() });
}

#[test]
fn test_broken_placeholder_is_removed() {
    let registry = VersionRegistry::new();
    let doc = TokenDocument::from_value(json!({
        "type": "LazyRowToken",
        "id": "carousel",
        "version": "1.0.0",
        "children": [],
        "placeholder": { "type": "SpacerToken", "id": "ph", "version": "3.0.0", "width": 1 }
    }))
    .unwrap();

    let (migrated, report) = Migrator::new(&registry).migrate_with_report(&doc, &v(1, 1, 0)).unwrap();
    assert!(migrated.get("placeholder").is_none());
    assert_eq!(report.dropped[0].field, "placeholder");
    assert_eq!(report.dropped[0].parent_id, "carousel");
}

// =============================================================================
// Registry-driven and concurrent use
// =============================================================================

#[test]
fn test_migrate_to_registered_version() {
    let mut registry = VersionRegistry::new();
    let migrator_err = Migrator::new(&registry).migrate_to_registered(&screen()).unwrap_err();
    assert_eq!(migrator_err, MigrationError::UnregisteredComponent("ColumnToken".to_string()));

    registry.register_version("ColumnToken", v(1, 3, 0));
    assert_eq!(Migrator::new(&registry).registered_target(&screen()).unwrap(), v(1, 3, 0));
    let migrated = Migrator::new(&registry).migrate_to_registered(&screen()).unwrap();
    assert_eq!(migrated.meta().version, v(1, 3, 0));
}

#[test]
fn test_batches_share_a_read_only_registry() {
    let mut registry = VersionRegistry::new();
    registry.register_field_migration("TextToken", "text", |old, _| {
        Ok(json!(format!("{}!", old.as_str().unwrap_or_default())))
    });
    let trees: Vec<Token> = (0..4).map(|_| screen()).collect();

    let results = std::thread::scope(|scope| {
        let handles: Vec<_> = trees
            .chunks(2)
            .map(|chunk| {
                let registry = &registry;
                scope.spawn(move || Migrator::new(registry).migrate_batch(chunk, &v(1, 1, 0)))
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(results.len(), 4);
    for result in results {
        let value = result.unwrap().to_value();
        assert_eq!(value["children"][0]["text"], "Welcome!");
        assert_eq!(value["children"][3]["placeholder"]["text"], "Loading!");
    }
}
