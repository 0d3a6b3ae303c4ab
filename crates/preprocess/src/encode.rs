//! Categorical encoding with a degrading fallback chain.
//!
//! Training label-encoded each categorical column over its string values
//! with absent values mapped to [`crate::MISSING_SENTINEL`]. At inference
//! time the same table is applied, degrading step by step when the table or
//! the label is unavailable. Each arm is a deliberate accuracy/availability
//! trade-off: the sentinel class and class 0 are materially different
//! predictions, so the order of the chain is part of the contract.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::MISSING_SENTINEL;

/// Trained label-to-code table for one categorical column.
///
/// `classes` is the vocabulary in trained order; a label's code is its
/// position. Read-only at inference time.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct EncoderTable {
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl EncoderTable {
    #[must_use]
    pub fn new(classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as i64))
            .collect();
        Self { classes, index }
    }

    /// Looks up the trained code for a label.
    #[must_use]
    pub fn code(&self, label: &str) -> Option<i64> {
        self.index.get(label).copied()
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl From<Vec<String>> for EncoderTable {
    fn from(classes: Vec<String>) -> Self {
        Self::new(classes)
    }
}

/// All loaded per-column encoder tables, keyed by column name.
pub type EncoderTables = HashMap<String, EncoderTable>;

/// Which degradation arm produced an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFallback {
    /// No trained table exists for the column; code 0 was used.
    NoEncoder,
    /// The label was outside the trained vocabulary; the missing-sentinel
    /// class was used instead.
    UnknownLabel,
    /// The label was unknown and the vocabulary has no sentinel class
    /// either; code 0 (first class) was used.
    NoSentinelClass,
}

/// Result of encoding one categorical value.
///
/// Always a valid code; `fallback` tags which degradation arm fired, if
/// any, so callers and tests can distinguish the paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub code: i64,
    pub fallback: Option<EncodingFallback>,
}

impl Encoded {
    const fn direct(code: i64) -> Self {
        Self {
            code,
            fallback: None,
        }
    }

    const fn degraded(code: i64, reason: EncodingFallback) -> Self {
        Self {
            code,
            fallback: Some(reason),
        }
    }
}

/// Encodes a raw categorical value against a column's trained table.
///
/// The chain, in order: no table at all yields 0; otherwise the string form
/// of the value (or the missing sentinel when the value is absent or null)
/// is looked up; an unknown label falls back to the sentinel class; and if
/// the vocabulary holds no sentinel either, the first class index 0 is
/// used. Total function: always returns a non-negative code.
#[must_use]
pub fn encode(table: Option<&EncoderTable>, raw: Option<&Value>) -> Encoded {
    let Some(table) = table else {
        return Encoded::degraded(0, EncodingFallback::NoEncoder);
    };

    let label = label_form(raw);
    if let Some(code) = table.code(&label) {
        return Encoded::direct(code);
    }
    match table.code(MISSING_SENTINEL) {
        Some(code) => Encoded::degraded(code, EncodingFallback::UnknownLabel),
        None => Encoded::degraded(0, EncodingFallback::NoSentinelClass),
    }
}

/// String form a value was label-encoded under during training.
///
/// Training stringified column values before fitting, with booleans
/// rendered as `True`/`False`; the lookup key must match that casing or a
/// boolean-valued column would always miss the vocabulary.
fn label_form(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => MISSING_SENTINEL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}
