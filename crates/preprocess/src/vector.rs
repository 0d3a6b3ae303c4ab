//! Feature vector assembly.
//!
//! Builds the model's input slots from one application record, in exact
//! trained column order. The numeric array's ordering is load-bearing: the
//! model and scaler were fitted on that positional contract, so the loops
//! below iterate the schema, never the record.

use serde_json::{Map, Value};

use crate::coerce::to_float;
use crate::derive::Derivations;
use crate::encode::{EncoderTables, encode};
use crate::record::ApplicationRecord;
use crate::scaler::StandardScaler;
use crate::schema::ColumnSchema;
use crate::MISSING_SENTINEL;

/// Named input slots the model consumes.
///
/// `numeric` is present only when the schema has numeric columns, and holds
/// the scaled (or raw, after a scaler fallback) array in schema order.
/// `categorical` carries one `(column, code)` pair per categorical column,
/// in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInputs {
    pub numeric: Option<Vec<f32>>,
    pub categorical: Vec<(String, i64)>,
}

/// Output of one feature-building pass.
#[derive(Debug, Clone)]
pub struct BuiltFeatures {
    pub inputs: ModelInputs,
    /// Column name to the value actually consumed: pre-scaling floats for
    /// numeric columns, raw value or the missing sentinel for categorical
    /// ones. Kept for audit; never passed to the model.
    pub features_used: Map<String, Value>,
    /// Notes for degradations that happened mid-build (currently only
    /// scaler failures). `None` when the pass was clean.
    pub preprocessing_log: Option<String>,
}

/// Assembles the model inputs and audit trail for one record.
///
/// Numeric columns present on the record coerce directly (default 0.0);
/// absent ones go through the derivation registry, or coerce to 0.0 when no
/// derivation is registered. A failing scaler is logged and the raw values
/// are used instead. Categorical columns encode through the degrading
/// chain. Total: never fails, every schema column produces exactly one
/// entry.
#[must_use]
pub fn build_feature_vector(
    record: &ApplicationRecord,
    schema: &ColumnSchema,
    scaler: Option<&StandardScaler>,
    encoders: &EncoderTables,
) -> BuiltFeatures {
    let derivations = Derivations::standard();
    let mut features_used = Map::new();
    let mut notes: Vec<String> = Vec::new();

    // Numeric slots, in trained order.
    let mut raw_numeric = Vec::with_capacity(schema.numeric_cols.len());
    for col in &schema.numeric_cols {
        let value = if record.contains(col) {
            to_float(record.get(col), 0.0)
        } else if let Some(derive) = derivations.get(col) {
            derive(record)
        } else {
            0.0
        };
        raw_numeric.push(value);
        features_used.insert(col.clone(), Value::from(value));
    }

    let numeric = if raw_numeric.is_empty() {
        None
    } else {
        Some(scale_or_fallback(scaler, &raw_numeric, &mut notes))
    };

    // Categorical slots, in trained order.
    let mut categorical = Vec::with_capacity(schema.cat_cols.len());
    for col in &schema.cat_cols {
        let raw = record.get(col).filter(|v| !v.is_null());
        let encoded = encode(encoders.get(col), raw);
        categorical.push((col.clone(), encoded.code));
        features_used.insert(
            col.clone(),
            raw.cloned()
                .unwrap_or_else(|| Value::from(MISSING_SENTINEL)),
        );
    }

    BuiltFeatures {
        inputs: ModelInputs {
            numeric,
            categorical,
        },
        features_used,
        preprocessing_log: if notes.is_empty() {
            None
        } else {
            Some(notes.join("; "))
        },
    }
}

fn scale_or_fallback(
    scaler: Option<&StandardScaler>,
    raw: &[f64],
    notes: &mut Vec<String>,
) -> Vec<f32> {
    let unscaled = || -> Vec<f32> { raw.iter().map(|v| *v as f32).collect() };
    match scaler {
        Some(scaler) => match scaler.transform(raw) {
            Ok(scaled) => scaled,
            Err(err) => {
                notes.push(format!("Scaler failed: {err}. Sending raw numeric values."));
                unscaled()
            }
        },
        None => unscaled(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use crate::encode::EncoderTable;

    use super::*;

    fn record(fields: serde_json::Value) -> ApplicationRecord {
        let Value::Object(map) = fields else {
            panic!("test fixture must be a JSON object");
        };
        ApplicationRecord::new(Uuid::new_v4(), map)
    }

    fn schema(numeric: &[&str], cat: &[&str]) -> ColumnSchema {
        ColumnSchema::new(
            numeric.iter().map(ToString::to_string).collect(),
            cat.iter().map(ToString::to_string).collect(),
        )
    }

    fn no_encoders() -> EncoderTables {
        EncoderTables::default()
    }

    #[test]
    fn numeric_array_follows_schema_order_not_record_order() {
        let schema = schema(&["daily_wage", "household_size", "num_earners"], &[]);
        // Field presence permuted relative to the schema.
        let rec = record(json!({
            "num_earners": 2,
            "daily_wage": 450,
        }));
        let built = build_feature_vector(&rec, &schema, None, &no_encoders());
        assert_eq!(built.inputs.numeric, Some(vec![450.0, 0.0, 2.0]));
    }

    #[test]
    fn absent_unmapped_column_defaults_to_zero() {
        let schema = schema(&["some_engineered_column"], &[]);
        let built = build_feature_vector(&record(json!({})), &schema, None, &no_encoders());
        assert_eq!(built.inputs.numeric, Some(vec![0.0]));
        assert_eq!(built.features_used["some_engineered_column"], json!(0.0));
    }

    #[test]
    fn derivations_fire_only_when_column_is_absent() {
        let schema = schema(&["electricity_avg_amount"], &[]);

        let derived = record(json!({
            "electricity_month1_amount": 100,
            "electricity_month3_amount": 300,
        }));
        let built = build_feature_vector(&derived, &schema, None, &no_encoders());
        assert_eq!(built.inputs.numeric, Some(vec![200.0]));

        // A direct column wins over the heuristic.
        let direct = record(json!({
            "electricity_avg_amount": 50,
            "electricity_month1_amount": 100,
        }));
        let built = build_feature_vector(&direct, &schema, None, &no_encoders());
        assert_eq!(built.inputs.numeric, Some(vec![50.0]));
    }

    #[test]
    fn empty_numeric_schema_omits_the_numeric_slot() {
        let schema = schema(&[], &["house_type"]);
        let built = build_feature_vector(&record(json!({})), &schema, None, &no_encoders());
        assert_eq!(built.inputs.numeric, None);
        assert_eq!(built.inputs.categorical.len(), 1);
    }

    #[test]
    fn scaler_applies_when_well_formed() {
        let schema = schema(&["household_size", "daily_wage"], &[]);
        let scaler = StandardScaler::new(vec![4.0, 400.0], vec![2.0, 100.0]);
        let rec = record(json!({ "household_size": 6, "daily_wage": 500 }));
        let built = build_feature_vector(&rec, &schema, Some(&scaler), &no_encoders());
        assert_eq!(built.inputs.numeric, Some(vec![1.0, 1.0]));
        assert_eq!(built.preprocessing_log, None);
        // Audit trail keeps the pre-scaling values.
        assert_eq!(built.features_used["household_size"], json!(6.0));
        assert_eq!(built.features_used["daily_wage"], json!(500.0));
    }

    #[test]
    fn scaler_failure_falls_back_to_raw_values_with_a_log() {
        let schema = schema(&["household_size", "daily_wage"], &[]);
        // Fitted on three columns; transform of two must fail.
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]);
        let rec = record(json!({ "household_size": 6, "daily_wage": 500 }));
        let built = build_feature_vector(&rec, &schema, Some(&scaler), &no_encoders());
        assert_eq!(built.inputs.numeric, Some(vec![6.0, 500.0]));
        let log = built.preprocessing_log.expect("scaler failure must be logged");
        assert!(log.contains("Scaler failed"));
    }

    #[test]
    fn categorical_slots_encode_in_order_and_record_provenance() {
        let schema = schema(&[], &["primary_occupation", "house_type"]);
        let mut encoders = EncoderTables::default();
        encoders.insert(
            "primary_occupation".to_string(),
            EncoderTable::new(vec![
                "__MISSING__".to_string(),
                "farmer".to_string(),
                "labourer".to_string(),
            ]),
        );

        let rec = record(json!({ "primary_occupation": "labourer" }));
        let built = build_feature_vector(&rec, &schema, None, &encoders);
        assert_eq!(
            built.inputs.categorical,
            vec![
                ("primary_occupation".to_string(), 2),
                // No table for house_type: degraded to 0.
                ("house_type".to_string(), 0),
            ]
        );
        assert_eq!(built.features_used["primary_occupation"], json!("labourer"));
        assert_eq!(built.features_used["house_type"], json!("__MISSING__"));
    }

    #[test]
    fn every_schema_column_lands_in_features_used() {
        let schema = schema(
            &["household_size", "phone_recharges_avg"],
            &["cooking_fuel"],
        );
        let built = build_feature_vector(&record(json!({})), &schema, None, &no_encoders());
        assert_eq!(built.features_used.len(), 3);
    }
}
