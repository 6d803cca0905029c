//! Document Type Inference
//!
//! Resolves the concrete variant of a weakly-typed token document. Senders may
//! omit the discriminator, so the rule order below is part of the wire
//! contract: the first matching rule wins and the order must never change.
//!
//! A field holding JSON `null` counts as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{HORIZONTAL_ALIGNMENTS, VERTICAL_ALIGNMENTS};
use crate::token::ComponentKind;

/// Name of the explicit discriminator field
pub const DISCRIMINATOR: &str = "type";

/// Which rule resolved the variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InferenceRule {
    Discriminator,
    HorizontalAlignment,
    VerticalAlignment,
    ContentAlignment,
    CardSurface,
    DefaultContainer,
    TextSignature,
    ButtonSignature,
    SpacerSignature,
    DividerSignature,
    SliderSignature,
    AsyncImageSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inference {
    pub kind: ComponentKind,
    pub rule: InferenceRule,
}

impl Inference {
    fn new(kind: ComponentKind, rule: InferenceRule) -> Self {
        Self { kind, rule }
    }
}

/// Infer the variant of a document; `None` when every rule is exhausted.
///
/// 1. An explicit `type` discriminator always wins (unknown names resolve to nothing).
/// 2. With `children`: alignment set, then `contentAlignment`, then
///    `elevation`/`shape`, then Box as the default container.
/// 3. Without `children`: leaf signatures in fixed order.
pub fn infer_component(doc: &Value) -> Option<Inference> {
    let object = doc.as_object()?;

    if let Some(tag) = present(object, DISCRIMINATOR) {
        return tag
            .as_str()
            .and_then(ComponentKind::from_name)
            .map(|kind| Inference::new(kind, InferenceRule::Discriminator));
    }

    if has(object, "children") {
        return Some(infer_container(object));
    }

    infer_leaf(object)
}

fn infer_container(object: &Map<String, Value>) -> Inference {
    if let Some(values) = alignment_values(object) {
        if values.iter().all(|v| HORIZONTAL_ALIGNMENTS.contains(v)) {
            return Inference::new(ComponentKind::Column, InferenceRule::HorizontalAlignment);
        }
        if values.iter().all(|v| VERTICAL_ALIGNMENTS.contains(v)) {
            return Inference::new(ComponentKind::Row, InferenceRule::VerticalAlignment);
        }
    }

    if has(object, "contentAlignment") {
        return Inference::new(ComponentKind::Box, InferenceRule::ContentAlignment);
    }

    if has(object, "elevation") || has(object, "shape") {
        return Inference::new(ComponentKind::Card, InferenceRule::CardSurface);
    }

    Inference::new(ComponentKind::Box, InferenceRule::DefaultContainer)
}

fn infer_leaf(object: &Map<String, Value>) -> Option<Inference> {
    let rules: [(bool, ComponentKind, InferenceRule); 6] = [
        (
            has(object, "text") && has(object, "style"),
            ComponentKind::Text,
            InferenceRule::TextSignature,
        ),
        (
            has(object, "text") && has(object, "onClick"),
            ComponentKind::Button,
            InferenceRule::ButtonSignature,
        ),
        (
            has(object, "width") || has(object, "height"),
            ComponentKind::Spacer,
            InferenceRule::SpacerSignature,
        ),
        (
            has(object, "thickness"),
            ComponentKind::Divider,
            InferenceRule::DividerSignature,
        ),
        (
            has(object, "initialValue") && has(object, "rangeStart"),
            ComponentKind::Slider,
            InferenceRule::SliderSignature,
        ),
        (
            has(object, "url") && has(object, "contentScale"),
            ComponentKind::AsyncImage,
            InferenceRule::AsyncImageSignature,
        ),
    ];

    rules
        .into_iter()
        .find(|(matched, _, _)| *matched)
        .map(|(_, kind, rule)| Inference::new(kind, rule))
}

/// The alignment value set: a single string or an array of strings.
/// Empty or non-string sets count as no alignment.
fn alignment_values(object: &Map<String, Value>) -> Option<Vec<&str>> {
    let values: Vec<&str> = match present(object, "alignment")? {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().map(Value::as_str).collect::<Option<_>>()?,
        _ => return None,
    };
    (!values.is_empty()).then_some(values)
}

fn present<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|v| !v.is_null())
}

fn has(object: &Map<String, Value>, field: &str) -> bool {
    present(object, field).is_some()
}
