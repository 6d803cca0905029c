//! Document type inference tests
//!
//! The rule order is a wire contract, so every rule gets a row here, including
//! the documents that match more than one signature.

use rstest::rstest;
use serde_json::{json, Value};

use token_schemas::schema::infer::{infer_component, InferenceRule};
use token_schemas::ComponentKind;

#[rstest]
#[case(json!({ "type": "TextToken" }), ComponentKind::Text, InferenceRule::Discriminator)]
#[case(json!({ "type": "Card", "children": [] }), ComponentKind::Card, InferenceRule::Discriminator)]
#[case(json!({ "children": [], "alignment": "Center" }), ComponentKind::Column, InferenceRule::HorizontalAlignment)]
#[case(json!({ "children": [], "alignment": ["Top", "Bottom"] }), ComponentKind::Row, InferenceRule::VerticalAlignment)]
#[case(json!({ "children": [], "contentAlignment": "BottomEnd" }), ComponentKind::Box, InferenceRule::ContentAlignment)]
#[case(json!({ "children": [], "elevation": 4 }), ComponentKind::Card, InferenceRule::CardSurface)]
#[case(json!({ "children": [], "shape": "Circle" }), ComponentKind::Card, InferenceRule::CardSurface)]
#[case(json!({ "children": [] }), ComponentKind::Box, InferenceRule::DefaultContainer)]
#[case(json!({ "text": "a", "style": {} }), ComponentKind::Text, InferenceRule::TextSignature)]
#[case(json!({ "text": "a", "onClick": {} }), ComponentKind::Button, InferenceRule::ButtonSignature)]
#[case(json!({ "height": 8 }), ComponentKind::Spacer, InferenceRule::SpacerSignature)]
#[case(json!({ "thickness": 1 }), ComponentKind::Divider, InferenceRule::DividerSignature)]
#[case(json!({ "initialValue": 0, "rangeStart": 0 }), ComponentKind::Slider, InferenceRule::SliderSignature)]
#[case(json!({ "url": "u", "contentScale": "Fit" }), ComponentKind::AsyncImage, InferenceRule::AsyncImageSignature)]
fn test_each_rule(#[case] doc: Value, #[case] kind: ComponentKind, #[case] rule: InferenceRule) {
    let inference = infer_component(&doc).unwrap();
    assert_eq!(inference.kind, kind);
    assert_eq!(inference.rule, rule);
}

/// Documents matching several rules resolve to the earliest one
#[rstest]
#[case(json!({ "text": "a", "style": {}, "onClick": {} }), ComponentKind::Text)]
#[case(json!({ "text": "a", "onClick": {}, "width": 10 }), ComponentKind::Button)]
#[case(json!({ "width": 1, "thickness": 1 }), ComponentKind::Spacer)]
#[case(json!({ "children": [], "alignment": "Top", "elevation": 2 }), ComponentKind::Row)]
#[case(json!({ "children": [], "contentAlignment": "Center", "shape": "Rounded" }), ComponentKind::Box)]
#[case(json!({ "children": [], "text": "a", "style": {} }), ComponentKind::Box)]
fn test_first_matching_rule_wins(#[case] doc: Value, #[case] kind: ComponentKind) {
    assert_eq!(infer_component(&doc).map(|i| i.kind), Some(kind));
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "text": "orphan" }))]
#[case(json!({ "initialValue": 0.5 }))]
#[case(json!({ "url": "u" }))]
#[case(json!({ "type": "Marquee", "text": "a", "style": {} }))]
#[case(json!({ "thickness": null }))]
#[case(json!([{ "thickness": 1 }]))]
fn test_unresolved(#[case] doc: Value) {
    assert_eq!(infer_component(&doc), None);
}

#[test]
fn test_inference_is_deterministic() {
    let doc = json!({ "children": [], "alignment": ["Start", "CenterVertically"], "elevation": 1 });
    let first = infer_component(&doc);
    for _ in 0..10 {
        assert_eq!(infer_component(&doc), first);
    }
    assert_eq!(first.map(|i| i.kind), Some(ComponentKind::Card));
}
