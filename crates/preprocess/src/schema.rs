//! Trained column-order metadata.

use serde::Deserialize;

/// The model's input column contract, fixed at training time.
///
/// Both sequences define set *and* positional order of the model inputs;
/// the model and scaler were fitted against this exact order, so it is
/// never reordered or deduplicated at runtime. An absent metadata artifact
/// yields empty lists (degraded mode).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnSchema {
    #[serde(default)]
    pub numeric_cols: Vec<String>,
    #[serde(default)]
    pub cat_cols: Vec<String>,
}

impl ColumnSchema {
    #[must_use]
    pub const fn new(numeric_cols: Vec<String>, cat_cols: Vec<String>) -> Self {
        Self {
            numeric_cols,
            cat_cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_preserving_order() {
        let schema: ColumnSchema = serde_json::from_str(
            r#"{
                "numeric_cols": ["household_size", "daily_wage", "household_size"],
                "cat_cols": ["primary_occupation"]
            }"#,
        )
        .unwrap();
        // Duplicates and order are preserved verbatim.
        assert_eq!(
            schema.numeric_cols,
            vec!["household_size", "daily_wage", "household_size"]
        );
        assert_eq!(schema.cat_cols, vec!["primary_occupation"]);
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let schema: ColumnSchema = serde_json::from_str("{}").unwrap();
        assert!(schema.numeric_cols.is_empty());
        assert!(schema.cat_cols.is_empty());
    }
}
