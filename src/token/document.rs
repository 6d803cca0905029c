//! Weakly-typed token documents
//!
//! A [`TokenDocument`] is a JSON object tree with the same shape contract as a
//! [`Token`](super::Token), but fields are read by name. Documents are used for
//! payloads whose discriminator is missing or untrusted (legacy senders), so
//! the variant is inferred rather than read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MigrationError;

/// Placeholder id reported for documents without an `id` field
pub const ANONYMOUS_ID: &str = "<anonymous>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDocument(Value);

impl TokenDocument {
    /// Wrap a JSON value; the root must be an object
    pub fn from_value(value: Value) -> Result<Self, MigrationError> {
        if !value.is_object() {
            return Err(MigrationError::InvalidDocument {
                token_id: ANONYMOUS_ID.to_string(),
                reason: "token document must be a JSON object".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn parse(text: &str) -> Result<Self, MigrationError> {
        let value: Value = serde_json::from_str(text).map_err(|e| MigrationError::InvalidDocument {
            token_id: ANONYMOUS_ID.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or(ANONYMOUS_ID)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Child documents. Non-array `children` values are not treated as children.
    pub fn child_documents(&self) -> Option<Vec<TokenDocument>> {
        self.0
            .get("children")
            .and_then(Value::as_array)
            .map(|items| items.iter().cloned().map(TokenDocument).collect())
    }

    /// Set or remove (`Value::Null`) a top-level field
    pub(crate) fn set(mut self, name: &str, value: Value) -> Self {
        if let Some(object) = self.0.as_object_mut() {
            if value.is_null() {
                object.remove(name);
            } else {
                object.insert(name.to_string(), value);
            }
        }
        self
    }

    /// Wrap without the object check; nested values are checked when read
    pub(crate) fn wrap_unchecked(value: Value) -> Self {
        Self(value)
    }
}

impl From<TokenDocument> for Value {
    fn from(doc: TokenDocument) -> Self {
        doc.0
    }
}
