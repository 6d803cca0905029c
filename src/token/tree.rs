//! Tree accessor abstraction
//!
//! The migration engine, validator and compatibility checker are written once
//! against [`TokenTree`] and reused for typed [`Token`]s and weakly-typed
//! [`TokenDocument`]s.

use serde_json::Value;

use super::document::{TokenDocument, ANONYMOUS_ID};
use super::{ComponentKind, Token};
use crate::error::MigrationError;
use crate::schema::infer;
use crate::version::SemanticVersion;

/// Read and rebuild access to one node of a token tree.
///
/// The `with_*` methods consume the node and return the updated copy; callers
/// that need to keep the original clone first.
pub trait TokenTree: Clone + Sized {
    fn token_id(&self) -> &str;

    fn version(&self) -> Result<SemanticVersion, MigrationError>;

    /// Oldest client floor this token still supports; `0.0.0` when undeclared
    fn min_supported_version(&self) -> Result<SemanticVersion, MigrationError>;

    fn component(&self) -> Result<ComponentKind, MigrationError>;

    /// Ordered children of a container, `None` for leaves
    fn children(&self) -> Option<Vec<Self>>;

    fn with_children(self, children: Vec<Self>) -> Self;

    fn with_version(self, version: SemanticVersion) -> Self;

    /// Field value by wire name
    fn field(&self, name: &str) -> Option<Value>;

    /// Replace a field by wire name; `Value::Null` removes it
    fn with_field(self, name: &str, value: Value) -> Result<Self, MigrationError>;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, MigrationError>;
}

// =============================================================================
// Typed Tokens
// =============================================================================

impl TokenTree for Token {
    fn token_id(&self) -> &str {
        self.id()
    }

    fn version(&self) -> Result<SemanticVersion, MigrationError> {
        Ok(self.meta().version)
    }

    fn min_supported_version(&self) -> Result<SemanticVersion, MigrationError> {
        Ok(self.meta().min_supported_version)
    }

    fn component(&self) -> Result<ComponentKind, MigrationError> {
        Ok(self.kind())
    }

    fn children(&self) -> Option<Vec<Self>> {
        self.child_tokens().map(<[Token]>::to_vec)
    }

    fn with_children(self, children: Vec<Self>) -> Self {
        self.with_child_tokens(children)
    }

    fn with_version(self, version: SemanticVersion) -> Self {
        Token::with_version(self, version)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match self.to_value() {
            Value::Object(mut object) => object.remove(name),
            _ => None,
        }
    }

    fn with_field(self, name: &str, value: Value) -> Result<Self, MigrationError> {
        let id = self.id().to_string();
        let mut object = match self.to_value() {
            Value::Object(object) => object,
            _ => {
                return Err(MigrationError::InvalidDocument {
                    token_id: id,
                    reason: "token did not serialize to an object".to_string(),
                })
            }
        };
        if value.is_null() {
            object.remove(name);
        } else {
            object.insert(name.to_string(), value);
        }
        serde_json::from_value(Value::Object(object)).map_err(|e| MigrationError::InvalidDocument {
            token_id: id,
            reason: format!("field '{name}': {e}"),
        })
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn from_value(value: Value) -> Result<Self, MigrationError> {
        let token_id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(ANONYMOUS_ID)
            .to_string();
        serde_json::from_value(value).map_err(|e| MigrationError::InvalidDocument {
            token_id,
            reason: e.to_string(),
        })
    }
}

// =============================================================================
// Documents
// =============================================================================

impl TokenTree for TokenDocument {
    fn token_id(&self) -> &str {
        self.id()
    }

    fn version(&self) -> Result<SemanticVersion, MigrationError> {
        let raw = self.get("version").ok_or_else(|| MigrationError::InvalidDocument {
            token_id: self.id().to_string(),
            reason: "missing version".to_string(),
        })?;
        read_version(self.id(), raw)
    }

    fn min_supported_version(&self) -> Result<SemanticVersion, MigrationError> {
        match self.get("minSupportedVersion") {
            None | Some(Value::Null) => Ok(SemanticVersion::ZERO),
            Some(raw) => read_version(self.id(), raw),
        }
    }

    fn component(&self) -> Result<ComponentKind, MigrationError> {
        infer::infer_component(self.as_value())
            .map(|inference| inference.kind)
            .ok_or_else(|| MigrationError::UnresolvedType {
                token_id: self.id().to_string(),
            })
    }

    fn children(&self) -> Option<Vec<Self>> {
        self.child_documents()
    }

    fn with_children(self, children: Vec<Self>) -> Self {
        let items = children.into_iter().map(TokenDocument::into_value).collect();
        self.set("children", Value::Array(items))
    }

    fn with_version(self, version: SemanticVersion) -> Self {
        self.set("version", Value::String(version.to_string()))
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn with_field(self, name: &str, value: Value) -> Result<Self, MigrationError> {
        Ok(self.set(name, value))
    }

    fn to_value(&self) -> Value {
        self.as_value().clone()
    }

    fn from_value(value: Value) -> Result<Self, MigrationError> {
        match value {
            Value::Object(_) => Ok(TokenDocument::wrap_unchecked(value)),
            other => Err(MigrationError::InvalidDocument {
                token_id: ANONYMOUS_ID.to_string(),
                reason: format!("expected an object, got {other}"),
            }),
        }
    }
}

fn read_version(token_id: &str, raw: &Value) -> Result<SemanticVersion, MigrationError> {
    serde_json::from_value(raw.clone()).map_err(|e| MigrationError::InvalidDocument {
        token_id: token_id.to_string(),
        reason: format!("invalid version {raw}: {e}"),
    })
}
