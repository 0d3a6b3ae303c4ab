//! Feature engineering for the income prediction model.
//!
//! This crate turns a heterogeneous, partially-missing loan application
//! record into the fixed-order, fixed-shape inputs the trained model
//! consumes: a scaled numeric array in exact trained column order plus one
//! integer code per categorical column. Every operation here is total:
//! missing, malformed or unknown values degrade to defined defaults rather
//! than aborting a prediction.

pub mod coerce;
pub mod derive;
pub mod encode;
pub mod record;
pub mod scaler;
pub mod schema;
pub mod vector;

pub use encode::{Encoded, EncoderTable, EncoderTables, EncodingFallback, encode};
pub use record::ApplicationRecord;
pub use scaler::{ScaleError, StandardScaler};
pub use schema::ColumnSchema;
pub use vector::{BuiltFeatures, ModelInputs, build_feature_vector};

/// Placeholder token substituted for an absent categorical value before
/// encoding. Training fitted the encoders with this exact token, so it must
/// match byte for byte.
pub const MISSING_SENTINEL: &str = "__MISSING__";
