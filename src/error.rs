//! Error types for the token engine

use thiserror::Error;

use crate::version::SemanticVersion;

/// Result type for token operations
pub type Result<T> = std::result::Result<T, Error>;

/// Version parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Empty version string")]
    Empty,

    #[error("Invalid version '{input}': {reason}")]
    Malformed { input: String, reason: String },

    #[error("Pre-release or build metadata not supported: {0}")]
    Unsupported(String),
}

/// Migration failures.
///
/// `DowngradeNotSupported` and `UnresolvedType` are expected outcomes the
/// caller branches on (usually by rendering a fallback). `CustomMigrationFailure`
/// points at a defect in caller-supplied code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    #[error("Cannot migrate {token_id} from {from} down to {to}")]
    DowngradeNotSupported {
        token_id: String,
        from: SemanticVersion,
        to: SemanticVersion,
    },

    #[error("Could not resolve component type of token {token_id}")]
    UnresolvedType { token_id: String },

    #[error("Custom migration of {component_id}{} failed: {reason}", field_suffix(.field))]
    CustomMigrationFailure {
        component_id: String,
        field: Option<String>,
        reason: String,
    },

    #[error("Component not registered: {0}")]
    UnregisteredComponent(String),

    #[error("Invalid token document {token_id}: {reason}")]
    InvalidDocument { token_id: String, reason: String },
}

fn field_suffix(field: &Option<String>) -> String {
    field.as_deref().map(|f| format!(".{f}")).unwrap_or_default()
}

impl MigrationError {
    /// Whether this is an expected outcome (fallback rendering) rather than a defect
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MigrationError::DowngradeNotSupported { .. } | MigrationError::UnresolvedType { .. }
        )
    }
}

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Component not registered: {0}")]
    UnregisteredComponent(String),

    #[error("Snapshot checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Schema export error: {0}")]
    SchemaExport(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
