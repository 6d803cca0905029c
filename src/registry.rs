//! Version Registry
//!
//! Tracks the current version of every component, the table of explicitly
//! registered migration paths, and per-field migration callbacks.
//!
//! The registry is an owned value: create it at session start, mutate it
//! through `&mut self`, share it read-only (`&VersionRegistry`) with any number
//! of concurrent migrations. Persisting it is up to the caller; the
//! [`RegistrySnapshot`] type is the serialized shape.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::checksum::Checksum;
use crate::error::RegistryError;
use crate::version::SemanticVersion;

/// Whole-token or single-field transformation attached to a migration path
pub type TransformFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// Callback for a `(componentId, fieldName)` pair; receives the old field value
/// (`Value::Null` when absent) and the target version.
pub type FieldMigrationFn =
    Arc<dyn Fn(Value, &SemanticVersion) -> anyhow::Result<Value> + Send + Sync>;

// =============================================================================
// Migration Paths
// =============================================================================

/// Custom transformation scope
#[derive(Clone)]
pub enum Transformation {
    /// Replaces the whole token; the default rule is skipped
    Token(TransformFn),
    /// Rewrites one field; the default rule still applies to everything else
    Field { name: String, transform: TransformFn },
}

impl fmt::Debug for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::Token(_) => f.write_str("Transformation::Token(..)"),
            Transformation::Field { name, .. } => write!(f, "Transformation::Field({name})"),
        }
    }
}

/// An explicitly registered `from -> to` edge for one component
#[derive(Debug, Clone)]
pub struct MigrationPath {
    pub description: String,
    pub breaking: bool,
    pub transformation: Option<Transformation>,
}

impl MigrationPath {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            breaking: false,
            transformation: None,
        }
    }

    /// Mark as a breaking change
    pub fn breaking(mut self) -> Self {
        self.breaking = true;
        self
    }

    pub fn with_token_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.transformation = Some(Transformation::Token(Arc::new(transform)));
        self
    }

    pub fn with_field_transform<F>(mut self, field: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.transformation = Some(Transformation::Field {
            name: field.into(),
            transform: Arc::new(transform),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    component_id: String,
    from: SemanticVersion,
    to: SemanticVersion,
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Default)]
pub struct VersionRegistry {
    versions: HashMap<String, SemanticVersion>,
    paths: HashMap<PathKey, MigrationPath>,
    field_migrations: HashMap<(String, String), FieldMigrationFn>,
}

impl fmt::Debug for VersionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionRegistry")
            .field("versions", &self.versions)
            .field("paths", &self.paths.len())
            .field("field_migrations", &self.field_migrations.len())
            .finish()
    }
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the current version of a component
    pub fn register_version(&mut self, component_id: impl Into<String>, version: SemanticVersion) {
        let component_id = component_id.into();
        debug!(component = %component_id, %version, "registering component version");
        self.versions.insert(component_id, version);
    }

    pub fn get_version(&self, component_id: &str) -> Option<SemanticVersion> {
        self.versions.get(component_id).copied()
    }

    /// Update a registered component. Returns `false` and inserts nothing when
    /// the component was never registered.
    pub fn update_version(&mut self, component_id: &str, version: SemanticVersion) -> bool {
        self.try_update_version(component_id, version).is_ok()
    }

    pub fn try_update_version(
        &mut self,
        component_id: &str,
        version: SemanticVersion,
    ) -> Result<SemanticVersion, RegistryError> {
        let Some(current) = self.versions.get_mut(component_id) else {
            warn!(component = component_id, "update of unregistered component rejected");
            return Err(RegistryError::UnregisteredComponent(component_id.to_string()));
        };
        let previous = std::mem::replace(current, version);
        debug!(component = component_id, %previous, %version, "updated component version");
        Ok(previous)
    }

    /// Store an exact `from -> to` edge. Paths are never composed: registering
    /// `A -> B` and `B -> C` does not make `A -> C` resolvable.
    pub fn register_migration_path(
        &mut self,
        component_id: impl Into<String>,
        from: SemanticVersion,
        to: SemanticVersion,
        path: MigrationPath,
    ) {
        let component_id = component_id.into();
        info!(
            component = %component_id,
            %from,
            %to,
            breaking = path.breaking,
            "registering migration path"
        );
        self.paths.insert(PathKey { component_id, from, to }, path);
    }

    pub fn get_migration_path(
        &self,
        component_id: &str,
        from: &SemanticVersion,
        to: &SemanticVersion,
    ) -> Option<&MigrationPath> {
        self.paths.get(&PathKey {
            component_id: component_id.to_string(),
            from: *from,
            to: *to,
        })
    }

    /// Register the callback used for `field` of `component_id` on every migration
    pub fn register_field_migration<F>(
        &mut self,
        component_id: impl Into<String>,
        field: impl Into<String>,
        callback: F,
    ) where
        F: Fn(Value, &SemanticVersion) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let key = (component_id.into(), field.into());
        debug!(component = %key.0, field = %key.1, "registering field migration");
        self.field_migrations.insert(key, Arc::new(callback));
    }

    pub fn field_migration(&self, component_id: &str, field: &str) -> Option<&FieldMigrationFn> {
        self.field_migrations
            .get(&(component_id.to_string(), field.to_string()))
    }

    /// Fields of a component that have callbacks, sorted by name
    pub fn field_migrations_for(&self, component_id: &str) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .field_migrations
            .keys()
            .filter(|(component, _)| component == component_id)
            .map(|(_, field)| field.as_str())
            .collect();
        fields.sort_unstable();
        fields
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, SemanticVersion)> {
        self.versions.iter().map(|(id, v)| (id.as_str(), *v))
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    // -------------------------------------------------------------------------
    // Persistence shape
    // -------------------------------------------------------------------------

    /// Flat, deterministic view of the registry. Transformations and field
    /// callbacks are code and are not part of the snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut components: Vec<ComponentEntry> = self
            .versions
            .iter()
            .map(|(id, version)| ComponentEntry {
                component_id: id.clone(),
                version: *version,
            })
            .collect();
        components.sort_by(|a, b| a.component_id.cmp(&b.component_id));

        let mut migration_paths: Vec<MigrationPathEntry> = self
            .paths
            .iter()
            .map(|(key, path)| MigrationPathEntry {
                component_id: key.component_id.clone(),
                from_version: key.from,
                to_version: key.to,
                migration_path: PathRecord {
                    description: path.description.clone(),
                    breaking: path.breaking,
                },
            })
            .collect();
        migration_paths.sort_by(|a, b| {
            (&a.component_id, a.from_version, a.to_version)
                .cmp(&(&b.component_id, b.from_version, b.to_version))
        });

        let checksum = Checksum::from_json(&RegistrySnapshot::checksummed(&components, &migration_paths));
        RegistrySnapshot {
            components,
            migration_paths,
            exported_at: Utc::now(),
            checksum,
        }
    }

    /// Rebuild a registry from a snapshot. Custom transformations and field
    /// callbacks must be registered again by the caller.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut registry = Self::new();
        for entry in snapshot.components {
            registry.versions.insert(entry.component_id, entry.version);
        }
        for entry in snapshot.migration_paths {
            let path = MigrationPath {
                description: entry.migration_path.description,
                breaking: entry.migration_path.breaking,
                transformation: None,
            };
            registry.paths.insert(
                PathKey {
                    component_id: entry.component_id,
                    from: entry.from_version,
                    to: entry.to_version,
                },
                path,
            );
        }
        registry
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let content = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn load_snapshot(path: impl AsRef<Path>, verify_checksum: bool) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path.as_ref())?;
        let snapshot: RegistrySnapshot = serde_json::from_str(&content)?;
        if verify_checksum {
            snapshot.verify()?;
        }
        info!(
            components = snapshot.components.len(),
            paths = snapshot.migration_paths.len(),
            "loaded registry snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }
}

// =============================================================================
// Snapshot
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    pub component_id: String,
    pub version: SemanticVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRecord {
    pub description: String,
    #[serde(default)]
    pub breaking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPathEntry {
    pub component_id: String,
    pub from_version: SemanticVersion,
    pub to_version: SemanticVersion,
    pub migration_path: PathRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub components: Vec<ComponentEntry>,
    pub migration_paths: Vec<MigrationPathEntry>,
    pub exported_at: DateTime<Utc>,
    /// Covers `components` and `migrationPaths`, not the timestamp
    pub checksum: Checksum,
}

impl RegistrySnapshot {
    fn checksummed(components: &[ComponentEntry], paths: &[MigrationPathEntry]) -> Value {
        json!({
            "components": components,
            "migrationPaths": paths,
        })
    }

    pub fn verify(&self) -> Result<(), RegistryError> {
        let content = Self::checksummed(&self.components, &self.migration_paths);
        if !self.checksum.verify_json(&content) {
            return Err(RegistryError::ChecksumMismatch {
                expected: self.checksum.to_string(),
                actual: Checksum::from_json(&content).to_string(),
            });
        }
        Ok(())
    }
}
