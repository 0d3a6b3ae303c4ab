//! Income scoring service for loan applications.
//!
//! Scores stored applications with the pretrained income model and
//! persists the results.

use anyhow::Result;
use burn::backend::NdArray;
use burn::backend::ndarray::NdArrayDevice;
use clap::{Parser, Subcommand};
use config::Config;
use database::{create_pool, run_migrations};
use income_score::commands;
use model_artifacts::ArtifactRegistry;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

type Backend = NdArray;

/// Income scoring service for loan applications
#[derive(Parser)]
#[command(name = "income-score")]
#[command(about = "Scores loan applications with the pretrained income model")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single application and store the result
    Predict {
        /// Application id to score
        #[arg(short, long)]
        id: Uuid,
    },

    /// Score every completed application without an output for the
    /// current model name and version
    Batch {
        /// Maximum number of applications to score
        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let pool = create_pool(&config.database_url).await?;

    match cli.command {
        Commands::Predict { id } => {
            let registry = load_registry(&config)?;
            commands::predict::run(&pool, &registry, id).await?;
        }
        Commands::Batch { limit } => {
            let registry = load_registry(&config)?;
            commands::batch::run(&pool, &registry, limit).await?;
        }
        Commands::Migrate => {
            run_migrations(&pool).await?;
            info!("Migrations completed successfully");
        }
    }

    Ok(())
}

/// Loads the artifact registry once; shared read-only afterwards.
fn load_registry(config: &Config) -> Result<ArtifactRegistry<Backend>> {
    let device = NdArrayDevice::default();
    ArtifactRegistry::load(
        &config.artifacts,
        config.model_name.clone(),
        config.model_version.clone(),
        &device,
    )
}
