//! Token Schemas
//!
//! Versioning, migration and validation for server-driven UI token trees.
//!
//! ## Features
//!
//! - **Semantic Versioning**: every token carries a version and the oldest
//!   client floor it still supports
//! - **Migration**: one generic engine moves typed [`Token`]s and weakly-typed
//!   [`TokenDocument`]s forward through registered migration paths
//! - **Type Inference**: documents without a `type` discriminator resolve to a
//!   variant by a fixed, ordered set of field signatures
//! - **Validation**: structural and semantic checks, accumulated rather than
//!   short-circuited
//! - **Compatibility Checking**: render-or-fallback decisions per client floor
//! - **Checksum Validation**: SHA256 checksums on registry snapshots
//!
//! ## Architecture
//!
//! ```text
//! tree + target ──► Migrator ──► migrated tree ──► Validator ──► Vec<ValidationError>
//!                      │
//!          VersionRegistry + SchemaCatalog
//! ```

pub mod checksum;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod migration;
pub mod registry;
pub mod schema;
pub mod token;
pub mod validate;
pub mod version;

pub use checksum::Checksum;
pub use compatibility::{is_compatible, is_compatible_legacy, CompatibilityChecker, CompatibilityReport};
pub use config::TokenConfig;
pub use error::{Error, MigrationError, RegistryError, Result, VersionError};
pub use migration::{MigrationReport, Migrator};
pub use registry::{MigrationPath, RegistrySnapshot, VersionRegistry};
pub use schema::infer::infer_component;
pub use schema::SchemaCatalog;
pub use token::{ComponentKind, Token, TokenDocument, TokenTree};
pub use validate::{validate, ValidationError, ValidationKind, Validator};
pub use version::SemanticVersion;
