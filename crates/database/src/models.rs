//! Database model types.

use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Input for persisting one prediction in the model-outputs table.
#[derive(Debug, Clone)]
pub struct CreateModelOutput {
    pub application_id: Uuid,
    pub model_name: String,
    pub model_version: String,
    pub predicted_income: f64,
    pub prediction_confidence: Option<f64>,
    /// Raw model output, kept verbatim for audit.
    pub prediction_raw: serde_json::Value,
    /// Column name to the value actually consumed for this prediction.
    pub features_used: serde_json::Value,
    pub preprocessing_log: Option<String>,
}

/// Row identity returned by a successful output insert.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct InsertedOutput {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}
