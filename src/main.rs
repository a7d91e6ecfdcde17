use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitlab_provisioner::{validate, GitLabClient, Manifest, Settings, SyncEngine, ValidationReport};

#[derive(Parser)]
#[command(name = "gitlab-provisioner")]
#[command(about = "Synchronize declarative repository settings against GitLab")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize repository settings from a YAML manifest
    Sync {
        /// Path to the YAML manifest
        #[arg(short, long, default_value = "repositories.yml")]
        config: PathBuf,

        /// Show what would be changed without touching the remote
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a YAML manifest without contacting GitLab
    Validate {
        /// Path to the YAML manifest
        #[arg(short, long, default_value = "repositories.yml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting gitlab-provisioner v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Sync { config, dry_run } => cmd_sync(&config, dry_run).await,
        Commands::Validate { config } => cmd_validate(&config).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Synchronize repository settings from a manifest
async fn cmd_sync(config_path: &Path, dry_run: bool) -> Result<()> {
    println!(
        "🔄 Syncing repository settings from {}",
        config_path.display()
    );

    let manifest = Manifest::load(config_path)?;

    let report = validate(&manifest);
    if !report.is_valid() {
        print_validation_errors(&report);
        std::process::exit(1);
    }
    println!("✅ Manifest validated successfully");

    if dry_run {
        println!("🔍 Dry run mode - no changes will be made");
        println!("📋 Would process the following repositories:");
        for entry in &manifest.repositories {
            println!(
                "   - {} (default branch: {})",
                entry.path, entry.default_branch
            );
        }
        return Ok(());
    }

    let settings = Settings::from_env().context("GitLab settings are incomplete")?;
    let client = GitLabClient::new(&settings)?;
    let engine = SyncEngine::new(Arc::new(client));

    println!("🚀 Starting synchronization...");
    let summary = engine.execute(&manifest).await?;

    println!("\n📊 Sync Results:");
    println!("   Total repositories: {}", summary.total_repositories);
    println!("   Updated repositories: {}", summary.updated_repositories);
    println!("   Skipped repositories: {}", summary.skipped_repositories);

    if !summary.errors.is_empty() {
        eprintln!("\n❌ Errors:");
        for failure in &summary.errors {
            eprintln!("   - {}: {}", failure.path, failure.error);
        }
        std::process::exit(1);
    }

    println!(
        "\n✅ Synchronization completed in {:.2}s",
        summary.duration.as_secs_f64()
    );
    Ok(())
}

/// Validate a manifest without contacting the remote
async fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("🔍 Validating manifest: {}", config_path.display());

    let manifest = Manifest::load(config_path)?;
    let report = validate(&manifest);

    if !report.is_valid() {
        print_validation_errors(&report);
        std::process::exit(1);
    }

    println!("✅ Manifest is valid");
    println!("📊 Found {} repositories", manifest.repositories.len());

    let namespaces: BTreeSet<&str> = manifest
        .repositories
        .iter()
        .filter_map(|entry| entry.path.split('/').next())
        .collect();
    println!("🏢 Found {} unique namespaces", namespaces.len());

    Ok(())
}

/// Print accumulated validation errors to stderr
fn print_validation_errors(report: &ValidationReport) {
    eprintln!("❌ Manifest validation failed:");
    for error in &report.errors {
        eprintln!("   - {}: {}", error.field, error.message);
    }
}
