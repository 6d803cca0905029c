//! Token Tool CLI
//!
//! Migrates, validates and checks token trees stored as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use token_schemas::{
    CompatibilityChecker, ComponentKind, Migrator, SchemaCatalog, SemanticVersion, Token, TokenConfig,
    TokenDocument, TokenTree, Validator, VersionRegistry,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "token-tool")]
#[command(about = "Migrate, validate and check UI token trees")]
struct Cli {
    /// Config file (defaults to tokens.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Registry snapshot, overrides the configured one
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a token tree to a newer version
    Migrate {
        /// Token tree (JSON)
        input: PathBuf,
        /// Target version; defaults to the registry's version for the root component
        #[arg(short, long)]
        to: Option<SemanticVersion>,
        /// Parse as a typed token instead of a document
        #[arg(long)]
        typed: bool,
        /// Output file; prints to stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a token tree
    Validate {
        /// Token tree (JSON)
        input: PathBuf,
    },

    /// Check which tokens a client can render
    Check {
        /// Token tree (JSON)
        input: PathBuf,
        /// Client floor; defaults to the configured one
        #[arg(short, long)]
        floor: Option<SemanticVersion>,
    },

    /// Export the token catalog as JSON Schema
    Schema {
        /// Output file; prints to stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create registry snapshots
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },
}

#[derive(Subcommand)]
enum RegistryCommands {
    /// Print the registry snapshot
    Show,
    /// Verify a snapshot's checksum
    Verify {
        path: PathBuf,
    },
    /// Write a snapshot registering every component at one version
    Init {
        path: PathBuf,
        #[arg(long, default_value = "1.0.0")]
        version: SemanticVersion,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref().and_then(Path::to_str);
    let mut config = TokenConfig::load_from(config_path).context("loading configuration")?;
    if let Some(snapshot) = cli.snapshot {
        config.registry.snapshot = Some(snapshot);
    }
    let format = config.output.format;

    match cli.command {
        Commands::Migrate { input, to, typed, output } => {
            let registry = load_registry(&config)?;
            let value = read_json(&input)?;

            let migrated = if typed {
                let token: Token = serde_json::from_value(value).context("parsing typed token")?;
                migrate_tree(&registry, &token, to)?
            } else {
                let document = TokenDocument::from_value(value)?;
                migrate_tree(&registry, &document, to)?
            };

            write_output(output.as_deref(), &format.render(&migrated)?)
        }

        Commands::Validate { input } => {
            let document = TokenDocument::from_value(read_json(&input)?)?;
            let errors = Validator::new().validate(&document);

            if errors.is_empty() {
                println!("✅ {} is valid", input.display());
                return Ok(());
            }
            for error in &errors {
                println!("  ❌ {}", error);
            }
            bail!("{} validation errors in {}", errors.len(), input.display())
        }

        Commands::Check { input, floor } => {
            let document = TokenDocument::from_value(read_json(&input)?)?;
            let floor = floor.unwrap_or(config.client.floor);
            let report = CompatibilityChecker::new(floor).report(&document);

            if report.is_compatible() {
                println!("✅ {}", report.summary());
            } else {
                println!("⚠️  {}", report.summary());
                for id in &report.fallback_ids {
                    println!("  - {}", id);
                }
            }
            Ok(())
        }

        Commands::Schema { output } => {
            let schema = SchemaCatalog::standard().to_json_schema();
            write_output(output.as_deref(), &format.render(&schema)?)
        }

        Commands::Registry { command } => match command {
            RegistryCommands::Show => {
                let registry = load_registry(&config)?;
                let snapshot = serde_json::to_value(registry.snapshot())?;
                println!("{}", format.render(&snapshot)?);
                Ok(())
            }
            RegistryCommands::Verify { path } => {
                VersionRegistry::load_snapshot(&path, true)
                    .with_context(|| format!("verifying {}", path.display()))?;
                println!("✅ {} - checksum valid", path.display());
                Ok(())
            }
            RegistryCommands::Init { path, version } => {
                let mut registry = VersionRegistry::new();
                for kind in ComponentKind::ALL {
                    registry.register_version(kind.as_str(), version);
                }
                registry.save_snapshot(&path)?;
                println!("✅ Wrote {} components to {}", ComponentKind::ALL.len(), path.display());
                Ok(())
            }
        },
    }
}

fn migrate_tree<T>(registry: &VersionRegistry, tree: &T, to: Option<SemanticVersion>) -> anyhow::Result<Value>
where
    T: TokenTree,
{
    let migrator = Migrator::new(registry);
    let target = match to {
        Some(target) => target,
        None => migrator.registered_target(tree).context("no target version; pass --to")?,
    };
    let (migrated, report) = migrator.migrate_with_report(tree, &target)?;

    for dropped in &report.dropped {
        warn!(
            token = %dropped.token_id,
            parent = %dropped.parent_id,
            field = %dropped.field,
            error = %dropped.error,
            "dropped during migration"
        );
    }
    info!(token = migrated.token_id(), lossless = report.is_lossless(), "migration finished");
    Ok(migrated.to_value())
}

fn load_registry(config: &TokenConfig) -> anyhow::Result<VersionRegistry> {
    match config.snapshot_path() {
        Some(path) => VersionRegistry::load_snapshot(&path, config.registry.verify_checksum)
            .with_context(|| format!("loading registry snapshot {}", path.display())),
        None => {
            warn!("no registry snapshot configured, using an empty registry");
            Ok(VersionRegistry::new())
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("✅ Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
