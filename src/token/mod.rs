//! Token model
//!
//! A [`Token`] is a typed node of a UI description tree. Container variants own
//! an ordered list of children; leaf variants own none. On the wire every token
//! is a camelCase JSON object whose `type` field names its component.
//!
//! [`TokenDocument`] is the weakly-typed twin used when the variant cannot be
//! trusted, and [`TokenTree`] is the accessor abstraction the migration engine,
//! validator and compatibility checker are written against.

pub mod document;
pub mod tree;

pub use document::TokenDocument;
pub use tree::TokenTree;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::SemanticVersion;

// =============================================================================
// Component Kinds
// =============================================================================

/// The closed set of token variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Column,
    Row,
    Box,
    Card,
    LazyColumn,
    LazyRow,
    Text,
    Button,
    Spacer,
    Divider,
    Slider,
    AsyncImage,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 12] = [
        ComponentKind::Column,
        ComponentKind::Row,
        ComponentKind::Box,
        ComponentKind::Card,
        ComponentKind::LazyColumn,
        ComponentKind::LazyRow,
        ComponentKind::Text,
        ComponentKind::Button,
        ComponentKind::Spacer,
        ComponentKind::Divider,
        ComponentKind::Slider,
        ComponentKind::AsyncImage,
    ];

    /// Component id used for registry and migration-path lookups, and as the
    /// wire discriminator (e.g. `"TextToken"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Column => "ColumnToken",
            ComponentKind::Row => "RowToken",
            ComponentKind::Box => "BoxToken",
            ComponentKind::Card => "CardToken",
            ComponentKind::LazyColumn => "LazyColumnToken",
            ComponentKind::LazyRow => "LazyRowToken",
            ComponentKind::Text => "TextToken",
            ComponentKind::Button => "ButtonToken",
            ComponentKind::Spacer => "SpacerToken",
            ComponentKind::Divider => "DividerToken",
            ComponentKind::Slider => "SliderToken",
            ComponentKind::AsyncImage => "AsyncImageToken",
        }
    }

    /// Resolve a component id or its short form (`"TextToken"` or `"Text"`)
    pub fn from_name(name: &str) -> Option<Self> {
        let short = name.strip_suffix("Token").unwrap_or(name);
        Self::ALL.into_iter().find(|kind| {
            kind.as_str()
                .strip_suffix("Token")
                .is_some_and(|candidate| candidate == short)
        })
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ComponentKind::Column
                | ComponentKind::Row
                | ComponentKind::Box
                | ComponentKind::Card
                | ComponentKind::LazyColumn
                | ComponentKind::LazyRow
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shared Values
// =============================================================================

/// Fields every token carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMeta {
    /// Unique within one tree, not globally
    pub id: String,
    pub version: SemanticVersion,
    #[serde(default)]
    pub min_supported_version: SemanticVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
}

impl TokenMeta {
    pub fn new(id: impl Into<String>, version: SemanticVersion) -> Self {
        Self {
            id: id.into(),
            version,
            min_supported_version: SemanticVersion::ZERO,
            accessibility: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub heading: bool,
}

/// RGBA color. Channels are signed so that out-of-range input survives
/// deserialization and is reported by validation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorValue {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
    pub alpha: i32,
}

impl ColorValue {
    pub const fn new(red: i32, green: i32, blue: i32, alpha: i32) -> Self {
        Self { red, green, blue, alpha }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Medium,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Navigate,
    OpenUrl,
    Submit,
    Share,
    Dismiss,
}

impl ActionType {
    /// Keys the action's `data` map must contain
    pub fn required_data_keys(&self) -> &'static [&'static str] {
        match self {
            ActionType::Navigate => &["target"],
            ActionType::OpenUrl => &["url"],
            ActionType::Submit => &["endpoint"],
            ActionType::Share => &["text"],
            ActionType::Dismiss => &[],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Navigate" => Some(ActionType::Navigate),
            "OpenUrl" => Some(ActionType::OpenUrl),
            "Submit" => Some(ActionType::Submit),
            "Share" => Some(ActionType::Share),
            "Dismiss" => Some(ActionType::Dismiss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlignment {
    #[default]
    Top,
    CenterVertically,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoxAlignment {
    #[default]
    TopStart,
    TopCenter,
    TopEnd,
    CenterStart,
    Center,
    CenterEnd,
    BottomStart,
    BottomCenter,
    BottomEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardShape {
    Rectangle,
    #[default]
    Rounded,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentScale {
    Crop,
    Fit,
    FillBounds,
    FillWidth,
    FillHeight,
    Inside,
    None,
}

// =============================================================================
// Container Variants
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default)]
    pub alignment: HorizontalAlignment,
    pub children: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default)]
    pub alignment: VerticalAlignment,
    pub children: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default)]
    pub content_alignment: BoxAlignment,
    pub children: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub shape: CardShape,
    pub children: Vec<Token>,
}

/// Column whose children are materialized on demand by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyColumnToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default)]
    pub alignment: HorizontalAlignment,
    pub children: Vec<Token>,
    /// Shown while items load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<std::boxed::Box<Token>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyRowToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default)]
    pub alignment: VerticalAlignment,
    pub children: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<std::boxed::Box<Token>>,
}

// =============================================================================
// Leaf Variants
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    pub text: String,
    pub style: TextStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    pub text: String,
    pub on_click: Action,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacerToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividerToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    pub thickness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    pub initial_value: f64,
    pub range_start: f64,
    pub range_end: f64,
    #[serde(default)]
    pub steps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_value_change: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncImageToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    pub url: String,
    pub content_scale: ContentScale,
}

// =============================================================================
// Token
// =============================================================================

/// A typed token. The `type` discriminator carries the component id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Token {
    #[serde(rename = "ColumnToken")]
    Column(ColumnToken),
    #[serde(rename = "RowToken")]
    Row(RowToken),
    #[serde(rename = "BoxToken")]
    Box(BoxToken),
    #[serde(rename = "CardToken")]
    Card(CardToken),
    #[serde(rename = "LazyColumnToken")]
    LazyColumn(LazyColumnToken),
    #[serde(rename = "LazyRowToken")]
    LazyRow(LazyRowToken),
    #[serde(rename = "TextToken")]
    Text(TextToken),
    #[serde(rename = "ButtonToken")]
    Button(ButtonToken),
    #[serde(rename = "SpacerToken")]
    Spacer(SpacerToken),
    #[serde(rename = "DividerToken")]
    Divider(DividerToken),
    #[serde(rename = "SliderToken")]
    Slider(SliderToken),
    #[serde(rename = "AsyncImageToken")]
    AsyncImage(AsyncImageToken),
}

impl Token {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Token::Column(_) => ComponentKind::Column,
            Token::Row(_) => ComponentKind::Row,
            Token::Box(_) => ComponentKind::Box,
            Token::Card(_) => ComponentKind::Card,
            Token::LazyColumn(_) => ComponentKind::LazyColumn,
            Token::LazyRow(_) => ComponentKind::LazyRow,
            Token::Text(_) => ComponentKind::Text,
            Token::Button(_) => ComponentKind::Button,
            Token::Spacer(_) => ComponentKind::Spacer,
            Token::Divider(_) => ComponentKind::Divider,
            Token::Slider(_) => ComponentKind::Slider,
            Token::AsyncImage(_) => ComponentKind::AsyncImage,
        }
    }

    pub fn meta(&self) -> &TokenMeta {
        match self {
            Token::Column(t) => &t.meta,
            Token::Row(t) => &t.meta,
            Token::Box(t) => &t.meta,
            Token::Card(t) => &t.meta,
            Token::LazyColumn(t) => &t.meta,
            Token::LazyRow(t) => &t.meta,
            Token::Text(t) => &t.meta,
            Token::Button(t) => &t.meta,
            Token::Spacer(t) => &t.meta,
            Token::Divider(t) => &t.meta,
            Token::Slider(t) => &t.meta,
            Token::AsyncImage(t) => &t.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut TokenMeta {
        match self {
            Token::Column(t) => &mut t.meta,
            Token::Row(t) => &mut t.meta,
            Token::Box(t) => &mut t.meta,
            Token::Card(t) => &mut t.meta,
            Token::LazyColumn(t) => &mut t.meta,
            Token::LazyRow(t) => &mut t.meta,
            Token::Text(t) => &mut t.meta,
            Token::Button(t) => &mut t.meta,
            Token::Spacer(t) => &mut t.meta,
            Token::Divider(t) => &mut t.meta,
            Token::Slider(t) => &mut t.meta,
            Token::AsyncImage(t) => &mut t.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    /// Children of a container, `None` for leaves
    pub fn child_tokens(&self) -> Option<&[Token]> {
        match self {
            Token::Column(t) => Some(&t.children),
            Token::Row(t) => Some(&t.children),
            Token::Box(t) => Some(&t.children),
            Token::Card(t) => Some(&t.children),
            Token::LazyColumn(t) => Some(&t.children),
            Token::LazyRow(t) => Some(&t.children),
            _ => None,
        }
    }

    fn child_tokens_mut(&mut self) -> Option<&mut Vec<Token>> {
        match self {
            Token::Column(t) => Some(&mut t.children),
            Token::Row(t) => Some(&mut t.children),
            Token::Box(t) => Some(&mut t.children),
            Token::Card(t) => Some(&mut t.children),
            Token::LazyColumn(t) => Some(&mut t.children),
            Token::LazyRow(t) => Some(&mut t.children),
            _ => None,
        }
    }

    /// Copy of this token stamped with `version`; every other field unchanged
    pub fn with_version(mut self, version: SemanticVersion) -> Self {
        self.meta_mut().version = version;
        self
    }

    /// Copy of this container with its children replaced. Leaves are returned as-is.
    pub fn with_child_tokens(mut self, children: Vec<Token>) -> Self {
        if let Some(slot) = self.child_tokens_mut() {
            *slot = children;
        }
        self
    }
}
