//! Schema Catalog
//!
//! Static, per-variant field specifications shared by the validator, the
//! document type inferer and the migration engine. Everything here is resolved
//! at compile time: required fields, JSON kinds, enum sets, semantic rules and
//! the per-field migration strategy.

pub mod export;
pub mod infer;

use crate::token::ComponentKind;

// =============================================================================
// Field Specs
// =============================================================================

/// JSON kind expected for a field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    /// `"MAJOR.MINOR.PATCH"` string or bare integer
    Version,
    Enum(&'static [&'static str]),
    Object(&'static ObjectSchema),
    /// Object whose values are all strings
    StringMap,
    /// A single nested token
    Token,
    /// An ordered list of tokens
    TokenList,
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Version => "version",
            FieldKind::Enum(_) => "enum string",
            FieldKind::Object(schema) => schema.name,
            FieldKind::StringMap => "string map",
            FieldKind::Token => "token",
            FieldKind::TokenList => "token list",
        }
    }
}

/// How the migration engine treats a field.
///
/// The static table only uses `Copy` and `Recursive`. A field becomes `Custom`
/// when a callback is registered for it in the
/// [`VersionRegistry`](crate::registry::VersionRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldStrategy {
    Copy,
    Recursive,
    Custom,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub strategy: FieldStrategy,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true, strategy: FieldStrategy::Copy }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false, strategy: FieldStrategy::Copy }
    }

    const fn recursive(self) -> Self {
        Self { strategy: FieldStrategy::Recursive, ..self }
    }
}

/// Cross-field and range invariants that plain structure cannot express
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticRule {
    /// `red`, `green`, `blue`, `alpha` each within `[0, 255]`
    ColorChannels,
    /// `value` within `[start, end]`
    WithinRange {
        value: &'static str,
        start: &'static str,
        end: &'static str,
    },
    /// Action `data` holds the keys its `type` requires
    ActionData,
    /// Numeric field is not negative
    NonNegative(&'static str),
}

/// Nested value object (colors, styles, actions)
#[derive(Debug)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    pub rules: &'static [SemanticRule],
}

#[derive(Debug)]
pub struct VariantSchema {
    pub kind: ComponentKind,
    pub fields: &'static [FieldSpec],
    pub rules: &'static [SemanticRule],
}

impl VariantSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }
}

// =============================================================================
// Enum Sets
// =============================================================================

pub const HORIZONTAL_ALIGNMENTS: &[&str] = &["Start", "Center", "End"];
pub const VERTICAL_ALIGNMENTS: &[&str] = &["Top", "CenterVertically", "Bottom"];
pub const BOX_ALIGNMENTS: &[&str] = &[
    "TopStart",
    "TopCenter",
    "TopEnd",
    "CenterStart",
    "Center",
    "CenterEnd",
    "BottomStart",
    "BottomCenter",
    "BottomEnd",
];
pub const CARD_SHAPES: &[&str] = &["Rectangle", "Rounded", "Circle"];
pub const FONT_WEIGHTS: &[&str] = &["Light", "Normal", "Medium", "Bold"];
pub const CONTENT_SCALES: &[&str] = &[
    "Crop",
    "Fit",
    "FillBounds",
    "FillWidth",
    "FillHeight",
    "Inside",
    "None",
];
pub const ACTION_TYPES: &[&str] = &["Navigate", "OpenUrl", "Submit", "Share", "Dismiss"];

/// Every component id, used for the `type` discriminator
pub const COMPONENT_IDS: &[&str] = &[
    "ColumnToken",
    "RowToken",
    "BoxToken",
    "CardToken",
    "LazyColumnToken",
    "LazyRowToken",
    "TextToken",
    "ButtonToken",
    "SpacerToken",
    "DividerToken",
    "SliderToken",
    "AsyncImageToken",
];

// =============================================================================
// Value Objects
// =============================================================================

pub static COLOR_VALUE: ObjectSchema = ObjectSchema {
    name: "ColorValue",
    fields: &[
        FieldSpec::required("red", FieldKind::Integer),
        FieldSpec::required("green", FieldKind::Integer),
        FieldSpec::required("blue", FieldKind::Integer),
        FieldSpec::required("alpha", FieldKind::Integer),
    ],
    rules: &[SemanticRule::ColorChannels],
};

pub static TEXT_STYLE: ObjectSchema = ObjectSchema {
    name: "TextStyle",
    fields: &[
        FieldSpec::required("fontSize", FieldKind::Number),
        FieldSpec::optional("fontWeight", FieldKind::Enum(FONT_WEIGHTS)),
        FieldSpec::optional("color", FieldKind::Object(&COLOR_VALUE)),
    ],
    rules: &[SemanticRule::NonNegative("fontSize")],
};

pub static ACTION: ObjectSchema = ObjectSchema {
    name: "Action",
    fields: &[
        FieldSpec::required("type", FieldKind::Enum(ACTION_TYPES)),
        FieldSpec::optional("data", FieldKind::StringMap),
    ],
    rules: &[SemanticRule::ActionData],
};

pub static ACCESSIBILITY: ObjectSchema = ObjectSchema {
    name: "Accessibility",
    fields: &[
        FieldSpec::optional("contentDescription", FieldKind::String),
        FieldSpec::optional("role", FieldKind::String),
        FieldSpec::optional("heading", FieldKind::Boolean),
    ],
    rules: &[],
};

/// Fields shared by every variant, checked before the variant's own fields
pub static COMMON_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("type", FieldKind::Enum(COMPONENT_IDS)),
    FieldSpec::required("id", FieldKind::String),
    FieldSpec::required("version", FieldKind::Version),
    FieldSpec::optional("minSupportedVersion", FieldKind::Version),
    FieldSpec::optional("accessibility", FieldKind::Object(&ACCESSIBILITY)),
];

// =============================================================================
// Variants
// =============================================================================

const CHILDREN: FieldSpec = FieldSpec::required("children", FieldKind::TokenList).recursive();
const PLACEHOLDER: FieldSpec = FieldSpec::optional("placeholder", FieldKind::Token).recursive();

static VARIANTS: [VariantSchema; 12] = [
    VariantSchema {
        kind: ComponentKind::Column,
        fields: &[
            FieldSpec::optional("alignment", FieldKind::Enum(HORIZONTAL_ALIGNMENTS)),
            CHILDREN,
        ],
        rules: &[],
    },
    VariantSchema {
        kind: ComponentKind::Row,
        fields: &[
            FieldSpec::optional("alignment", FieldKind::Enum(VERTICAL_ALIGNMENTS)),
            CHILDREN,
        ],
        rules: &[],
    },
    VariantSchema {
        kind: ComponentKind::Box,
        fields: &[
            FieldSpec::optional("contentAlignment", FieldKind::Enum(BOX_ALIGNMENTS)),
            CHILDREN,
        ],
        rules: &[],
    },
    VariantSchema {
        kind: ComponentKind::Card,
        fields: &[
            FieldSpec::optional("elevation", FieldKind::Number),
            FieldSpec::optional("shape", FieldKind::Enum(CARD_SHAPES)),
            CHILDREN,
        ],
        rules: &[SemanticRule::NonNegative("elevation")],
    },
    VariantSchema {
        kind: ComponentKind::LazyColumn,
        fields: &[
            FieldSpec::optional("alignment", FieldKind::Enum(HORIZONTAL_ALIGNMENTS)),
            CHILDREN,
            PLACEHOLDER,
        ],
        rules: &[],
    },
    VariantSchema {
        kind: ComponentKind::LazyRow,
        fields: &[
            FieldSpec::optional("alignment", FieldKind::Enum(VERTICAL_ALIGNMENTS)),
            CHILDREN,
            PLACEHOLDER,
        ],
        rules: &[],
    },
    VariantSchema {
        kind: ComponentKind::Text,
        fields: &[
            FieldSpec::required("text", FieldKind::String),
            FieldSpec::required("style", FieldKind::Object(&TEXT_STYLE)),
            FieldSpec::optional("maxLines", FieldKind::Integer),
        ],
        rules: &[SemanticRule::NonNegative("maxLines")],
    },
    VariantSchema {
        kind: ComponentKind::Button,
        fields: &[
            FieldSpec::required("text", FieldKind::String),
            FieldSpec::required("onClick", FieldKind::Object(&ACTION)),
            FieldSpec::optional("enabled", FieldKind::Boolean),
        ],
        rules: &[],
    },
    VariantSchema {
        kind: ComponentKind::Spacer,
        fields: &[
            FieldSpec::optional("width", FieldKind::Number),
            FieldSpec::optional("height", FieldKind::Number),
        ],
        rules: &[SemanticRule::NonNegative("width"), SemanticRule::NonNegative("height")],
    },
    VariantSchema {
        kind: ComponentKind::Divider,
        fields: &[
            FieldSpec::required("thickness", FieldKind::Number),
            FieldSpec::optional("color", FieldKind::Object(&COLOR_VALUE)),
        ],
        rules: &[SemanticRule::NonNegative("thickness")],
    },
    VariantSchema {
        kind: ComponentKind::Slider,
        fields: &[
            FieldSpec::required("initialValue", FieldKind::Number),
            FieldSpec::required("rangeStart", FieldKind::Number),
            FieldSpec::required("rangeEnd", FieldKind::Number),
            FieldSpec::optional("steps", FieldKind::Integer),
            FieldSpec::optional("onValueChange", FieldKind::Object(&ACTION)),
        ],
        rules: &[
            SemanticRule::WithinRange {
                value: "initialValue",
                start: "rangeStart",
                end: "rangeEnd",
            },
            SemanticRule::NonNegative("steps"),
        ],
    },
    VariantSchema {
        kind: ComponentKind::AsyncImage,
        fields: &[
            FieldSpec::required("url", FieldKind::String),
            FieldSpec::required("contentScale", FieldKind::Enum(CONTENT_SCALES)),
        ],
        rules: &[],
    },
];

static STANDARD: SchemaCatalog = SchemaCatalog { variants: &VARIANTS };

// =============================================================================
// Catalog
// =============================================================================

/// Read-only table of variant schemas
#[derive(Debug)]
pub struct SchemaCatalog {
    variants: &'static [VariantSchema],
}

impl SchemaCatalog {
    /// The catalog for the built-in token variants
    pub fn standard() -> &'static SchemaCatalog {
        &STANDARD
    }

    pub fn variants(&self) -> &'static [VariantSchema] {
        self.variants
    }

    pub fn variant(&self, kind: ComponentKind) -> Option<&'static VariantSchema> {
        self.variants.iter().find(|v| v.kind == kind)
    }

    pub fn common_fields(&self) -> &'static [FieldSpec] {
        COMMON_FIELDS
    }

    /// Static strategy of a field; unknown fields are copied
    pub fn strategy(&self, kind: ComponentKind, field: &str) -> FieldStrategy {
        self.variant(kind)
            .and_then(|v| v.field(field))
            .map(|f| f.strategy)
            .unwrap_or(FieldStrategy::Copy)
    }

    /// Value-object schemas referenced by variants, in a stable order
    pub fn object_schemas(&self) -> [&'static ObjectSchema; 4] {
        [&ACCESSIBILITY, &COLOR_VALUE, &TEXT_STYLE, &ACTION]
    }
}
