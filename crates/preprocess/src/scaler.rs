//! Numeric standard scaler artifact.

use serde::Deserialize;
use thiserror::Error;

/// Standardizing scaler fitted at training time: `(x - mean) / scale` per
/// position, in trained numeric column order.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// A scaler application that could not be performed.
///
/// Scaling failures are recoverable: the feature builder logs the reason
/// and falls back to the unscaled values.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("scaler expects {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("scaler artifact is inconsistent: {mean_len} means vs {scale_len} scales")]
    InconsistentArtifact { mean_len: usize, scale_len: usize },
}

impl StandardScaler {
    #[must_use]
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Number of numeric positions the scaler was fitted on.
    #[must_use]
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Standardizes one raw numeric vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector width does not match the fitted
    /// width, or the artifact itself is internally inconsistent.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f32>, ScaleError> {
        if self.mean.len() != self.scale.len() {
            return Err(ScaleError::InconsistentArtifact {
                mean_len: self.mean.len(),
                scale_len: self.scale.len(),
            });
        }
        if values.len() != self.mean.len() {
            return Err(ScaleError::LengthMismatch {
                expected: self.mean.len(),
                got: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| {
                // A zero scale would divide out to inf; constant columns
                // are stored with scale 1.0, so treat 0.0 the same way.
                let s = if *s == 0.0 { 1.0 } else { *s };
                ((v - m) / s) as f32
            })
            .collect())
    }
}
