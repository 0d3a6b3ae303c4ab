//! Batch command - scores every eligible un-scored application.
//!
//! Per-item fault isolation, no cross-item atomicity: a crash mid-batch
//! leaves a partially-scored set, and a re-run is safe because the
//! selection query re-excludes already-scored ids.

use anyhow::Result;
use burn::prelude::Backend;
use database::ApplicationRepository;
use model_artifacts::ArtifactRegistry;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::predictor;

/// Outcome of one application within a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub id: Uuid,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    fn ok(id: Uuid, predicted_income: f64) -> Self {
        Self {
            id,
            status: "ok",
            predicted_income: Some(predicted_income),
            error: None,
        }
    }

    fn error(id: Uuid, message: String) -> Self {
        Self {
            id,
            status: "error",
            predicted_income: None,
            error: Some(message),
        }
    }
}

/// Runs the batch command: selects up to `limit` completed applications
/// with no output for the current model name+version and scores them
/// sequentially.
///
/// # Errors
///
/// Returns an error only if the selection query itself fails; individual
/// scoring failures are captured per id and never abort the batch.
pub async fn run<B: Backend>(
    pool: &PgPool,
    registry: &ArtifactRegistry<B>,
    limit: i64,
) -> Result<Vec<BatchOutcome>> {
    let ids = ApplicationRepository::list_unscored(
        pool,
        registry.model_name(),
        registry.model_version(),
        limit,
    )
    .await?;

    info!(selected = ids.len(), limit, "selected unscored applications");

    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        match predictor::predict(pool, registry, id).await {
            Ok(prediction) => {
                info!(
                    application_id = %id,
                    predicted_income = prediction.predicted_income,
                    "scored"
                );
                results.push(BatchOutcome::ok(id, prediction.predicted_income));
            }
            Err(err) => {
                warn!(application_id = %id, error = %err, "scoring failed, continuing batch");
                results.push(BatchOutcome::error(id, err.to_string()));
            }
        }
    }

    info!(count = results.len(), "batch complete");
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "count": results.len(),
            "results": results,
        }))?
    );

    Ok(results)
}
