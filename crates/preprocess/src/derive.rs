//! Derivation heuristics for trained columns with no direct source field.
//!
//! Some trained numeric columns were engineered during training and do not
//! exist on the stored application row. Each such column gets a named
//! derivation function, registered once by column name; the feature builder
//! consults the table only when the row lacks the column outright.

use std::collections::HashMap;

use serde_json::Value;

use crate::coerce::{to_float, try_to_float};
use crate::record::ApplicationRecord;

/// Derives one feature value from the raw record.
pub type DeriveFn = fn(&ApplicationRecord) -> f64;

/// Registry of per-column derivation heuristics.
pub struct Derivations {
    by_column: HashMap<&'static str, DeriveFn>,
}

impl Derivations {
    /// The derivations matching the trained feature set.
    #[must_use]
    pub fn standard() -> Self {
        let mut by_column: HashMap<&'static str, DeriveFn> = HashMap::new();
        by_column.insert("electricity_avg_amount", electricity_avg_amount);
        by_column.insert("phone_recharges_avg", phone_recharges_avg);
        by_column.insert("other_land_size_hectare", other_land_size_hectare);
        Self { by_column }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<DeriveFn> {
        self.by_column.get(column).copied()
    }
}

impl Default for Derivations {
    fn default() -> Self {
        Self::standard()
    }
}

/// Mean of the coercible monthly electricity bill amounts; 0.0 when none
/// of the three months holds a usable number.
fn electricity_avg_amount(record: &ApplicationRecord) -> f64 {
    let months = [
        "electricity_month1_amount",
        "electricity_month2_amount",
        "electricity_month3_amount",
    ];
    let valid: Vec<f64> = months
        .iter()
        .filter_map(|field| record.get(field).and_then(try_to_float))
        .collect();
    mean_or_zero(&valid)
}

/// Mean recharge amount parsed from the `phone_recharges` event list.
///
/// The field may be stored as a JSON array or as its string serialization.
/// Each object entry contributes its `avg` field, deferring to `value`
/// when `avg` is absent, null, zero, empty, or false; entries without a
/// usable amount are skipped. Any parse failure, a non-array shape, or an
/// empty list yields 0.0.
fn phone_recharges_avg(record: &ApplicationRecord) -> f64 {
    let Some(raw) = record.get("phone_recharges") else {
        return 0.0;
    };

    let parsed;
    let list = match raw {
        Value::Array(list) => list,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(list)) => {
                parsed = list;
                &parsed
            }
            _ => return 0.0,
        },
        _ => return 0.0,
    };

    let amounts: Vec<f64> = list
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let avg = obj.get("avg").filter(|v| !is_blank(v));
            avg.or_else(|| obj.get("value")).and_then(try_to_float)
        })
        .collect();
    mean_or_zero(&amounts)
}

/// A blank `avg` defers to the entry's `value` field: null, false, zero,
/// or an empty string/array/object all count as blank.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Bool(true) => false,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Secondary land size, forced to 0.0 unless the companion
/// `has_other_land` flag affirms secondary land is held.
fn other_land_size_hectare(record: &ApplicationRecord) -> f64 {
    let no_other_land = match record.get("has_other_land") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => matches!(s.as_str(), "no" | "false"),
        _ => false,
    };
    if no_other_land {
        0.0
    } else {
        to_float(record.get("other_land_size_hectare"), 0.0)
    }
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn record(fields: serde_json::Value) -> ApplicationRecord {
        let Value::Object(map) = fields else {
            panic!("test fixture must be a JSON object");
        };
        ApplicationRecord::new(Uuid::new_v4(), map)
    }

    #[test]
    fn electricity_mean_ignores_uncoercible_months() {
        let rec = record(json!({
            "electricity_month1_amount": 100,
            "electricity_month2_amount": null,
            "electricity_month3_amount": 300,
        }));
        assert_eq!(electricity_avg_amount(&rec), 200.0);
    }

    #[test]
    fn electricity_mean_accepts_formatted_strings() {
        let rec = record(json!({
            "electricity_month1_amount": "1,200",
            "electricity_month2_amount": "abc",
        }));
        assert_eq!(electricity_avg_amount(&rec), 1200.0);
    }

    #[test]
    fn electricity_mean_defaults_to_zero_when_no_month_is_valid() {
        let rec = record(json!({ "electricity_month1_amount": "n/a" }));
        assert_eq!(electricity_avg_amount(&rec), 0.0);
        assert_eq!(electricity_avg_amount(&record(json!({}))), 0.0);
    }

    #[test]
    fn recharge_mean_mixes_avg_and_value_fields() {
        let rec = record(json!({
            "phone_recharges": [{"avg": "50"}, {"value": 70}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 60.0);
    }

    #[test]
    fn recharge_mean_parses_stringified_lists() {
        let rec = record(json!({
            "phone_recharges": r#"[{"avg": 30}, {"value": 90}]"#,
        }));
        assert_eq!(phone_recharges_avg(&rec), 60.0);
    }

    #[test]
    fn recharge_mean_skips_unusable_entries() {
        let rec = record(json!({
            "phone_recharges": [{"avg": "x"}, 5, {"note": "no amount"}, {"value": 40}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 40.0);
    }

    #[test]
    fn recharge_mean_null_avg_falls_back_to_value() {
        let rec = record(json!({
            "phone_recharges": [{"avg": null, "value": 25}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 25.0);
    }

    #[test]
    fn recharge_mean_blank_avg_falls_back_to_value() {
        let rec = record(json!({
            "phone_recharges": [{"avg": 0, "value": 40}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 40.0);

        let rec = record(json!({
            "phone_recharges": [{"avg": "", "value": 30}, {"avg": 0.0, "value": 50}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 40.0);

        // A blank avg with no value to fall back to contributes nothing.
        let rec = record(json!({
            "phone_recharges": [{"avg": 0}, {"avg": 20}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 20.0);
    }

    #[test]
    fn recharge_mean_nonzero_avg_wins_over_value() {
        let rec = record(json!({
            "phone_recharges": [{"avg": 15, "value": 99}],
        }));
        assert_eq!(phone_recharges_avg(&rec), 15.0);
    }

    #[test]
    fn recharge_mean_defaults_to_zero_on_bad_shapes() {
        assert_eq!(phone_recharges_avg(&record(json!({}))), 0.0);
        assert_eq!(
            phone_recharges_avg(&record(json!({"phone_recharges": "not json"}))),
            0.0
        );
        assert_eq!(
            phone_recharges_avg(&record(json!({"phone_recharges": {"avg": 10}}))),
            0.0
        );
        assert_eq!(
            phone_recharges_avg(&record(json!({"phone_recharges": []}))),
            0.0
        );
    }

    #[test]
    fn land_size_forced_to_zero_without_secondary_land() {
        for flag in [json!("no"), json!("false"), json!(false), json!(null)] {
            let rec = record(json!({
                "has_other_land": flag,
                "other_land_size_hectare": 3.5,
            }));
            assert_eq!(other_land_size_hectare(&rec), 0.0);
        }
        // Missing flag counts as no secondary land too.
        let rec = record(json!({ "other_land_size_hectare": 3.5 }));
        assert_eq!(other_land_size_hectare(&rec), 0.0);
    }

    #[test]
    fn land_size_coerced_when_flag_affirms() {
        let rec = record(json!({
            "has_other_land": "yes",
            "other_land_size_hectare": "2.5",
        }));
        assert_eq!(other_land_size_hectare(&rec), 2.5);

        let rec = record(json!({ "has_other_land": true }));
        assert_eq!(other_land_size_hectare(&rec), 0.0);
    }

    #[test]
    fn registry_knows_exactly_the_special_columns() {
        let derivations = Derivations::standard();
        assert!(derivations.get("electricity_avg_amount").is_some());
        assert!(derivations.get("phone_recharges_avg").is_some());
        assert!(derivations.get("other_land_size_hectare").is_some());
        assert!(derivations.get("household_size").is_none());
    }
}
