//! Process configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Context;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Paths to the trained model and its preprocessing artifacts
    pub artifacts: ArtifactPaths,

    /// Name recorded with every persisted prediction
    pub model_name: String,

    /// Version recorded with every persisted prediction
    pub model_version: String,
}

/// Filesystem locations of the trained artifacts.
///
/// Only the model checkpoint is mandatory; the scaler, encoder table and
/// column metadata may be absent, in which case the pipeline degrades to
/// unscaled inputs, default-encoded categoricals and empty column lists.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub encoders: PathBuf,
    pub metadata: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `DATABASE_URL`: `PostgreSQL` connection string
    ///
    /// Optional environment variables (defaults in parentheses):
    /// - `MODEL_PATH` (`artifacts/income_ann.mpk`)
    /// - `SCALER_PATH` (`artifacts/income_numeric_scaler.json`)
    /// - `ENCODERS_PATH` (`artifacts/income_label_encoders.json`)
    /// - `METADATA_PATH` (`artifacts/income_model_metadata.json`)
    /// - `MODEL_NAME` (`income_ann_optuna`)
    /// - `MODEL_VERSION` (`v1`)
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable not set")?;

        Ok(Self {
            database_url,
            artifacts: ArtifactPaths {
                model: env_path("MODEL_PATH", "artifacts/income_ann.mpk"),
                scaler: env_path("SCALER_PATH", "artifacts/income_numeric_scaler.json"),
                encoders: env_path("ENCODERS_PATH", "artifacts/income_label_encoders.json"),
                metadata: env_path("METADATA_PATH", "artifacts/income_model_metadata.json"),
            },
            model_name: env_or("MODEL_NAME", "income_ann_optuna"),
            model_version: env_or("MODEL_VERSION", "v1"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).map_or_else(|_| PathBuf::from(default), PathBuf::from)
}
