//! Prediction orchestration for one application.

use burn::prelude::Backend;
use chrono::{DateTime, Utc};
use database::{ApplicationRepository, CreateModelOutput, ModelOutputRepository};
use model_artifacts::ArtifactRegistry;
use preprocess::{ApplicationRecord, build_feature_vector};
use serde::Serialize;
use serde_json::{Map, Value, json};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Per-request failure taxonomy for a single scoring attempt.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("application {0} not found")]
    NotFound(Uuid),
    #[error("failed to read application record: {0}")]
    Database(#[source] sqlx::Error),
    #[error("model prediction failed: {0}")]
    Inference(#[source] anyhow::Error),
    #[error("failed to store prediction: {0}")]
    Persistence(#[source] sqlx::Error),
}

/// A persisted scoring result, as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub application_id: Uuid,
    pub model_name: String,
    pub model_version: String,
    pub predicted_income: f64,
    pub prediction_confidence: Option<f64>,
    /// Column name to the value actually consumed, kept for audit.
    pub features_used: Map<String, Value>,
    pub preprocessing_log: Option<String>,
    pub output_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Scores one application and persists the result.
///
/// The prediction is computed fully before anything is written; an
/// inference failure therefore never leaves a partial output behind. A
/// persistence failure after successful inference loses the computed
/// value; the caller must recompute on retry.
///
/// # Errors
///
/// See [`PredictError`]; no failure is retried here.
pub async fn predict<B: Backend>(
    pool: &PgPool,
    registry: &ArtifactRegistry<B>,
    application_id: Uuid,
) -> Result<Prediction, PredictError> {
    let record = resolve_record(
        application_id,
        ApplicationRepository::fetch_by_id(pool, application_id).await,
    )?;

    let built = build_feature_vector(
        &record,
        registry.schema(),
        registry.scaler(),
        registry.encoders(),
    );
    debug!(
        application_id = %application_id,
        features = built.features_used.len(),
        preprocessing_log = ?built.preprocessing_log,
        "feature vector built"
    );

    let pred_array = registry
        .invoke(&built.inputs)
        .map_err(PredictError::Inference)?;
    let predicted_income = pred_array.first().map(|v| f64::from(*v)).ok_or_else(|| {
        PredictError::Inference(anyhow::anyhow!("model returned an empty prediction array"))
    })?;

    let inserted = ModelOutputRepository::insert(
        pool,
        CreateModelOutput {
            application_id,
            model_name: registry.model_name().to_string(),
            model_version: registry.model_version().to_string(),
            predicted_income,
            // The wrapped model yields no confidence measure.
            prediction_confidence: None,
            prediction_raw: json!({ "pred_array": [pred_array] }),
            features_used: Value::Object(built.features_used.clone()),
            preprocessing_log: built.preprocessing_log.clone(),
        },
    )
    .await
    .map_err(PredictError::Persistence)?;

    Ok(Prediction {
        application_id,
        model_name: registry.model_name().to_string(),
        model_version: registry.model_version().to_string(),
        predicted_income,
        prediction_confidence: None,
        features_used: built.features_used,
        preprocessing_log: built.preprocessing_log,
        output_id: inserted.id,
        created_at: inserted.created_at,
    })
}

/// Maps a record fetch onto the per-request failure taxonomy: an absent
/// row is `NotFound`, a failed read is `Database`.
fn resolve_record(
    application_id: Uuid,
    fetched: Result<Option<ApplicationRecord>, sqlx::Error>,
) -> Result<ApplicationRecord, PredictError> {
    match fetched {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(PredictError::NotFound(application_id)),
        Err(err) => Err(PredictError::Database(err)),
    }
}
