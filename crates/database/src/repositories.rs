//! Repository functions for database operations.

use preprocess::ApplicationRecord;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateModelOutput, InsertedOutput};

/// Repository for loan application reads.
///
/// The applications table is read-only from this service; writes happen in
/// the intake system.
pub struct ApplicationRepository;

impl ApplicationRepository {
    /// Fetches one application row as an immutable field-map snapshot.
    ///
    /// Returns `None` when no application with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn fetch_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ApplicationRecord>, sqlx::Error> {
        let row: Option<Value> = sqlx::query_scalar(
            r"
            SELECT to_jsonb(la)
            FROM loan_applications la
            WHERE la.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match row {
            None => Ok(None),
            Some(Value::Object(fields)) => Ok(Some(ApplicationRecord::new(id, fields))),
            Some(_) => Err(sqlx::Error::Decode(
                "loan application row did not serialize to a JSON object".into(),
            )),
        }
    }

    /// Selects up to `limit` completed applications that have no output yet
    /// for this model name and version, most recently created first.
    ///
    /// Re-running after a partial batch is safe: already-scored ids are
    /// excluded by the anti-join.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_unscored(
        pool: &PgPool,
        model_name: &str,
        model_version: &str,
        limit: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r"
            SELECT la.id
            FROM loan_applications la
            LEFT JOIN loan_application_model_outputs mo
                ON mo.application_id = la.id
                AND mo.model_name = $1
                AND mo.model_version = $2
            WHERE la.submission_status = 'complete'
                AND mo.application_id IS NULL
            ORDER BY la.created_at DESC
            LIMIT $3
            ",
        )
        .bind(model_name)
        .bind(model_version)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

/// Repository for the append-only model-outputs table.
pub struct ModelOutputRepository;

impl ModelOutputRepository {
    /// Persists one prediction output.
    ///
    /// The table carries a unique index on `(application_id, model_name,
    /// model_version)`, so the slower of two racing scorers fails here
    /// instead of inserting a duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn insert(
        pool: &PgPool,
        input: CreateModelOutput,
    ) -> Result<InsertedOutput, sqlx::Error> {
        let id = Uuid::new_v4();

        sqlx::query_as(
            r"
            INSERT INTO loan_application_model_outputs
                (id, application_id, model_name, model_version, predicted_income,
                 prediction_confidence, prediction_raw, features_used, preprocessing_log)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, created_at
            ",
        )
        .bind(id)
        .bind(input.application_id)
        .bind(&input.model_name)
        .bind(&input.model_version)
        .bind(input.predicted_income)
        .bind(input.prediction_confidence)
        .bind(&input.prediction_raw)
        .bind(&input.features_used)
        .bind(input.preprocessing_log.as_deref())
        .fetch_one(pool)
        .await
    }
}
