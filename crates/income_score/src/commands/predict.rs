//! Predict command - scores one application and stores the result.

use anyhow::Result;
use burn::prelude::Backend;
use model_artifacts::ArtifactRegistry;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::predictor;

/// Runs the predict command.
///
/// # Errors
///
/// Returns an error if the application does not exist or scoring fails.
pub async fn run<B: Backend>(
    pool: &PgPool,
    registry: &ArtifactRegistry<B>,
    application_id: Uuid,
) -> Result<()> {
    info!(
        application_id = %application_id,
        model = registry.model_name(),
        version = registry.model_version(),
        "scoring application"
    );

    let prediction = predictor::predict(pool, registry, application_id).await?;

    info!(
        predicted_income = prediction.predicted_income,
        output_id = %prediction.output_id,
        "prediction stored"
    );
    println!("{}", serde_json::to_string_pretty(&prediction)?);

    Ok(())
}
