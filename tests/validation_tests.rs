//! Validator tests over whole trees

use serde_json::json;

use token_schemas::validate::validate_color;
use token_schemas::token::ColorValue;
use token_schemas::{validate, Token, TokenDocument, ValidationKind};

fn fixture(text: &str) -> TokenDocument {
    TokenDocument::parse(text).unwrap()
}

#[test]
fn test_valid_screen_is_clean_for_both_tree_kinds() {
    let document = fixture(include_str!("fixtures/screen_v1.json"));
    assert!(validate(&document).is_empty(), "{:?}", validate(&document));

    let token: Token = serde_json::from_str(include_str!("fixtures/screen_v1.json")).unwrap();
    assert!(validate(&token).is_empty(), "{:?}", validate(&token));
}

#[test]
fn test_errors_accumulate_in_pre_order() {
    let errors = validate(&fixture(include_str!("fixtures/invalid_screen.json")));
    let summary: Vec<_> = errors
        .iter()
        .map(|e| (e.token_id.as_str(), e.field.as_str(), e.kind))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("volume", "initialValue", ValidationKind::Semantic),
            ("rule", "color.red", ValidationKind::Semantic),
            ("rule", "color.green", ValidationKind::Semantic),
            ("rule", "color.alpha", ValidationKind::Semantic),
            ("share", "onClick.data.text", ValidationKind::Semantic),
            ("volume", "id", ValidationKind::Structural),
            ("volume", "width", ValidationKind::Semantic),
        ]
    );
}

#[test]
fn test_slider_out_of_range_is_one_error() {
    let slider = TokenDocument::from_value(json!({
        "type": "SliderToken",
        "id": "s",
        "version": "1.0.0",
        "initialValue": 5.0,
        "rangeStart": 0.0,
        "rangeEnd": 1.0
    }))
    .unwrap();

    let errors = validate(&slider);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "initialValue");
    assert_eq!(errors[0].kind, ValidationKind::Semantic);
}

#[test]
fn test_color_value_three_channels() {
    let errors = validate_color("swatch", "background", &ColorValue::new(300, -50, 0, 500));
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e.kind == ValidationKind::Semantic && e.token_id == "swatch"));
}

#[test]
fn test_oversized_color_channel_is_out_of_range() {
    let divider = TokenDocument::from_value(json!({
        "type": "DividerToken",
        "id": "rule",
        "version": "1.0.0",
        "thickness": 1.0,
        "color": { "red": u64::MAX, "green": 0, "blue": 0, "alpha": 255 }
    }))
    .unwrap();

    let errors = validate(&divider);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "color.red");
    assert_eq!(errors[0].kind, ValidationKind::Semantic);
    assert!(errors[0].message.contains(&u64::MAX.to_string()));
}

#[test]
fn test_structural_before_semantic_within_a_node() {
    let text = TokenDocument::from_value(json!({
        "type": "TextToken",
        "id": "t",
        "version": "1.0.0",
        "minSupportedVersion": "2.0.0",
        "text": 7,
        "style": { "fontSize": -3, "fontWeight": "Heavy" },
        "maxLines": -1
    }))
    .unwrap();

    let errors = validate(&text);
    let summary: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.kind)).collect();
    assert_eq!(
        summary,
        vec![
            ("text", ValidationKind::Structural),
            ("style.fontWeight", ValidationKind::Structural),
            ("minSupportedVersion", ValidationKind::Semantic),
            ("maxLines", ValidationKind::Semantic),
            ("style.fontSize", ValidationKind::Semantic),
        ]
    );
}

#[test]
fn test_unresolved_nodes_are_reported_and_children_still_checked() {
    let doc = TokenDocument::from_value(json!({
        "type": "Carousel",
        "id": "c",
        "version": "1.0.0",
        "children": [
            { "type": "DividerToken", "id": "d", "version": "1.0.0" }
        ]
    }))
    .unwrap();

    let errors = validate(&doc);
    assert_eq!(errors.len(), 2);
    assert_eq!((errors[0].token_id.as_str(), errors[0].field.as_str()), ("c", "type"));
    assert_eq!((errors[1].token_id.as_str(), errors[1].field.as_str()), ("d", "thickness"));
    assert_eq!(errors[1].kind, ValidationKind::Structural);
}

#[test]
fn test_inferred_documents_validate_without_discriminator() {
    let doc = TokenDocument::from_value(json!({
        "id": "img",
        "version": 1,
        "url": "https://example.com/a.png",
        "contentScale": "Stretch"
    }))
    .unwrap();

    let errors = validate(&doc);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "contentScale");
    assert!(errors[0].message.contains("Stretch"));
}

#[test]
fn test_errors_serialize_camel_case() {
    let errors = validate(&fixture(include_str!("fixtures/invalid_screen.json")));
    let value = serde_json::to_value(&errors[0]).unwrap();
    assert_eq!(value["tokenId"], "volume");
    assert_eq!(value["kind"], "Semantic");
}
