//! Migration Engine
//!
//! One generic algorithm that moves a token tree to a newer version. It is
//! written against [`TokenTree`], so typed [`Token`](crate::token::Token)s and
//! weakly-typed [`TokenDocument`](crate::token::TokenDocument)s share it.
//!
//! ## Algorithm
//!
//! 1. `current == target` returns the tree untouched.
//! 2. `current > target` fails with [`MigrationError::DowngradeNotSupported`].
//! 3. The component is resolved from the tag, or inferred for documents.
//! 4. An exact registered path `(component, current, target)` may carry a
//!    custom transformation. A whole-token transformation replaces the default
//!    rule; a field transformation rewrites one field and the default rule
//!    still runs.
//! 5. Default rule: container children are migrated independently and
//!    children that fail are dropped; then per-field strategies run
//!    (`Copy`, `Recursive`, or a registered `Custom` callback); finally the
//!    version is stamped.
//!
//! Dropping failed children is lossy. Use [`Migrator::migrate_with_report`]
//! to see what was dropped.

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::error::MigrationError;
use crate::registry::{Transformation, VersionRegistry};
use crate::schema::{FieldStrategy, SchemaCatalog};
use crate::token::document::ANONYMOUS_ID;
use crate::token::{ComponentKind, TokenTree};
use crate::version::SemanticVersion;

/// A subtree removed during migration
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedToken {
    /// Id of the dropped token
    pub token_id: String,
    /// Id of the container (or owner of the field) it was dropped from
    pub parent_id: String,
    /// Field it was held in (`children`, `placeholder`, ...)
    pub field: String,
    pub error: MigrationError,
}

/// What a migration dropped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub dropped: Vec<DroppedToken>,
}

impl MigrationReport {
    pub fn is_lossless(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Migrates token trees using a read-only registry
#[derive(Debug, Clone, Copy)]
pub struct Migrator<'r> {
    registry: &'r VersionRegistry,
    catalog: &'static SchemaCatalog,
}

impl<'r> Migrator<'r> {
    pub fn new(registry: &'r VersionRegistry) -> Self {
        Self {
            registry,
            catalog: SchemaCatalog::standard(),
        }
    }

    /// Migrate `tree` to `target`. The input is never modified.
    pub fn migrate<T: TokenTree>(&self, tree: &T, target: &SemanticVersion) -> Result<T, MigrationError> {
        let mut report = MigrationReport::default();
        self.migrate_node(tree.clone(), target, &mut report)
    }

    /// Like [`migrate`](Self::migrate), also returning the dropped subtrees
    pub fn migrate_with_report<T: TokenTree>(
        &self,
        tree: &T,
        target: &SemanticVersion,
    ) -> Result<(T, MigrationReport), MigrationError> {
        let mut report = MigrationReport::default();
        let migrated = self.migrate_node(tree.clone(), target, &mut report)?;
        Ok((migrated, report))
    }

    /// The version the registry holds for the root's component
    pub fn registered_target<T: TokenTree>(&self, tree: &T) -> Result<SemanticVersion, MigrationError> {
        let component_id = tree.component()?.as_str();
        self.registry
            .get_version(component_id)
            .ok_or_else(|| MigrationError::UnregisteredComponent(component_id.to_string()))
    }

    /// Migrate to the version the registry holds for the root's component
    pub fn migrate_to_registered<T: TokenTree>(&self, tree: &T) -> Result<T, MigrationError> {
        let target = self.registered_target(tree)?;
        self.migrate(tree, &target)
    }

    /// Migrate independent trees; results are in input order
    pub fn migrate_batch<T: TokenTree>(
        &self,
        trees: &[T],
        target: &SemanticVersion,
    ) -> Vec<Result<T, MigrationError>> {
        trees.iter().map(|tree| self.migrate(tree, target)).collect()
    }

    fn migrate_node<T: TokenTree>(
        &self,
        tree: T,
        target: &SemanticVersion,
        report: &mut MigrationReport,
    ) -> Result<T, MigrationError> {
        let current = tree.version()?;

        if current == *target {
            trace!(token = tree.token_id(), version = %current, "already at target");
            return Ok(tree);
        }

        if !current.can_migrate_to(target) {
            return Err(MigrationError::DowngradeNotSupported {
                token_id: tree.token_id().to_string(),
                from: current,
                to: *target,
            });
        }

        let kind = tree.component()?;
        let component_id = kind.as_str();
        let path = self.registry.get_migration_path(component_id, &current, target);

        let mut tree = tree;
        if let Some(path) = path {
            if path.breaking {
                info!(
                    token = tree.token_id(),
                    component = component_id,
                    from = %current,
                    to = %target,
                    "applying breaking migration path: {}",
                    path.description
                );
            }

            match &path.transformation {
                Some(Transformation::Token(transform)) => {
                    debug!(token = tree.token_id(), component = component_id, "whole-token transformation");
                    let value = transform(tree.to_value())
                        .map_err(|e| custom_failure(component_id, None, format!("{e:#}")))?;
                    let migrated = T::from_value(value).map_err(|e| {
                        custom_failure(component_id, None, format!("invalid shape: {e}"))
                    })?;
                    return Ok(migrated.with_version(*target));
                }
                Some(Transformation::Field { name, transform }) => {
                    debug!(token = tree.token_id(), component = component_id, field = %name, "field transformation");
                    let old = tree.field(name).unwrap_or(Value::Null);
                    let new = transform(old)
                        .map_err(|e| custom_failure(component_id, Some(name.as_str()), format!("{e:#}")))?;
                    tree = tree
                        .with_field(name, new)
                        .map_err(|e| custom_failure(component_id, Some(name.as_str()), format!("invalid shape: {e}")))?;
                }
                None => {}
            }
        } else {
            trace!(component = component_id, from = %current, to = %target, "no registered path, default rule");
        }

        let tree = self.migrate_children(tree, kind, target, report);
        let tree = self.migrate_fields(tree, kind, target, report)?;
        Ok(tree.with_version(*target))
    }

    /// Container rule: every child independently, failures dropped, order kept
    fn migrate_children<T: TokenTree>(
        &self,
        tree: T,
        kind: ComponentKind,
        target: &SemanticVersion,
        report: &mut MigrationReport,
    ) -> T {
        if self.registry.field_migration(kind.as_str(), "children").is_some() {
            return tree;
        }
        let Some(children) = tree.children() else {
            return tree;
        };

        let parent_id = tree.token_id().to_string();
        let mut migrated = Vec::with_capacity(children.len());
        for child in children {
            let child_id = child.token_id().to_string();
            match self.migrate_node(child, target, report) {
                Ok(child) => migrated.push(child),
                Err(error) => {
                    warn!(parent = %parent_id, child = %child_id, %error, "dropping child that failed to migrate");
                    report.dropped.push(DroppedToken {
                        token_id: child_id,
                        parent_id: parent_id.clone(),
                        field: "children".to_string(),
                        error,
                    });
                }
            }
        }

        tree.with_children(migrated)
    }

    /// Per-field strategies: catalog fields in table order, then fields that
    /// only have a registered callback, by name
    fn migrate_fields<T: TokenTree>(
        &self,
        mut tree: T,
        kind: ComponentKind,
        target: &SemanticVersion,
        report: &mut MigrationReport,
    ) -> Result<T, MigrationError> {
        let component_id = kind.as_str();
        let mut fields: Vec<&str> = self
            .catalog
            .variant(kind)
            .map(|variant| variant.fields.iter().map(|f| f.name).collect())
            .unwrap_or_default();
        for name in self.registry.field_migrations_for(component_id) {
            if !fields.contains(&name) {
                fields.push(name);
            }
        }

        for name in fields {
            let strategy = match self.registry.field_migration(component_id, name) {
                Some(_) => FieldStrategy::Custom,
                None => self.catalog.strategy(kind, name),
            };

            tree = match strategy {
                FieldStrategy::Copy => tree,
                // children are handled by the container rule
                FieldStrategy::Recursive if name == "children" => tree,
                FieldStrategy::Recursive => self.migrate_token_field(tree, name, target, report)?,
                FieldStrategy::Custom => self.apply_field_callback(tree, component_id, name, target)?,
            };
        }

        Ok(tree)
    }

    /// `Recursive` strategy for a field holding a token or a list of tokens
    fn migrate_token_field<T: TokenTree>(
        &self,
        tree: T,
        name: &str,
        target: &SemanticVersion,
        report: &mut MigrationReport,
    ) -> Result<T, MigrationError> {
        let Some(value) = tree.field(name) else {
            return Ok(tree);
        };
        let owner = tree.token_id().to_string();

        let migrated = match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .filter_map(|item| self.migrate_embedded::<T>(item, &owner, name, target, report))
                    .collect(),
            ),
            Value::Null => Value::Null,
            item => self
                .migrate_embedded::<T>(item, &owner, name, target, report)
                .unwrap_or(Value::Null),
        };

        tree.with_field(name, migrated)
    }

    fn migrate_embedded<T: TokenTree>(
        &self,
        item: Value,
        owner: &str,
        field: &str,
        target: &SemanticVersion,
        report: &mut MigrationReport,
    ) -> Option<Value> {
        let token_id = item
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(ANONYMOUS_ID)
            .to_string();
        let result = T::from_value(item).and_then(|node| self.migrate_node(node, target, report));

        match result {
            Ok(node) => Some(node.to_value()),
            Err(error) => {
                warn!(owner, field, token = %token_id, %error, "dropping embedded token that failed to migrate");
                report.dropped.push(DroppedToken {
                    token_id,
                    parent_id: owner.to_string(),
                    field: field.to_string(),
                    error,
                });
                None
            }
        }
    }

    fn apply_field_callback<T: TokenTree>(
        &self,
        tree: T,
        component_id: &str,
        name: &str,
        target: &SemanticVersion,
    ) -> Result<T, MigrationError> {
        let Some(callback) = self.registry.field_migration(component_id, name) else {
            return Ok(tree);
        };
        let old = tree.field(name).unwrap_or(Value::Null);
        let new = callback(old, target)
            .map_err(|e| custom_failure(component_id, Some(name), format!("{e:#}")))?;
        tree.with_field(name, new)
            .map_err(|e| custom_failure(component_id, Some(name), format!("invalid shape: {e}")))
    }
}

fn custom_failure(component_id: &str, field: Option<&str>, reason: String) -> MigrationError {
    MigrationError::CustomMigrationFailure {
        component_id: component_id.to_string(),
        field: field.map(str::to_string),
        reason,
    }
}
