//! Read-only registry of the trained artifacts.
//!
//! Loaded once at startup and passed by reference through the pipeline:
//! the model handle (mandatory), the numeric scaler, the per-column label
//! encoder tables, and the trained column-order metadata. The latter three
//! are optional; a failed load degrades to safe defaults instead of
//! failing startup.
//! Nothing mutates the registry after construction, so it is freely shared
//! across requests.

pub mod model;

pub use model::{IncomeModel, IncomeModelConfig, load_checkpoint};

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use burn::prelude::*;
use config::ArtifactPaths;
use preprocess::{ColumnSchema, EncoderTable, EncoderTables, ModelInputs, StandardScaler};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// The loaded artifact set, fixed for the process lifetime.
pub struct ArtifactRegistry<B: Backend> {
    model: IncomeModel<B>,
    model_config: IncomeModelConfig,
    device: B::Device,
    schema: ColumnSchema,
    scaler: Option<StandardScaler>,
    encoders: EncoderTables,
    model_name: String,
    model_version: String,
}

impl<B: Backend> ArtifactRegistry<B> {
    /// Loads all artifacts from their configured paths.
    ///
    /// The model checkpoint is mandatory; scaler, encoders and metadata
    /// degrade individually to `None` / empty tables / empty column lists
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the model checkpoint cannot be loaded; that is
    /// a fatal configuration problem.
    pub fn load(
        paths: &ArtifactPaths,
        model_name: String,
        model_version: String,
        device: &B::Device,
    ) -> anyhow::Result<Self> {
        let scaler: Option<StandardScaler> = load_optional_json(&paths.scaler, "numeric scaler");
        let encoders: EncoderTables =
            load_optional_json(&paths.encoders, "label encoders").unwrap_or_default();
        let schema: ColumnSchema =
            load_optional_json(&paths.metadata, "column metadata").unwrap_or_default();

        let model_config = sidecar_config(&paths.model, &schema, &encoders);
        let model = model::load_checkpoint(&paths.model, &model_config, device)
            .with_context(|| {
                format!("loading model checkpoint from {}", paths.model.display())
            })?;

        info!(
            model = %model_name,
            version = %model_version,
            numeric_cols = schema.numeric_cols.len(),
            cat_cols = schema.cat_cols.len(),
            scaler = scaler.is_some(),
            encoders = encoders.len(),
            "model artifacts loaded"
        );

        Ok(Self {
            model,
            model_config,
            device: device.clone(),
            schema,
            scaler,
            encoders,
            model_name,
            model_version,
        })
    }

    /// Assembles a registry from already-loaded parts. Test seam; also the
    /// path for embedding the registry into other hosts.
    pub fn from_parts(
        model: IncomeModel<B>,
        model_config: IncomeModelConfig,
        device: B::Device,
        schema: ColumnSchema,
        scaler: Option<StandardScaler>,
        encoders: EncoderTables,
        model_name: String,
        model_version: String,
    ) -> Self {
        Self {
            model,
            model_config,
            device,
            schema,
            scaler,
            encoders,
            model_name,
            model_version,
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn encoders(&self) -> &EncoderTables {
        &self.encoders
    }

    pub fn encoder_for(&self, column: &str) -> Option<&EncoderTable> {
        self.encoders.get(column)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Runs inference on one assembled input set.
    ///
    /// # Errors
    ///
    /// Returns an error when the input slots do not match the trained
    /// architecture or the output tensor cannot be read back; no partial
    /// result is produced.
    pub fn invoke(&self, inputs: &ModelInputs) -> anyhow::Result<Vec<f32>> {
        let numeric = match &inputs.numeric {
            Some(values) => {
                if values.len() != self.model_config.numeric_width {
                    bail!(
                        "numeric input has {} values, model expects {}",
                        values.len(),
                        self.model_config.numeric_width
                    );
                }
                Some(Tensor::<B, 1>::from_floats(values.as_slice(), &self.device).unsqueeze())
            }
            None => {
                if self.model_config.numeric_width != 0 {
                    bail!(
                        "numeric input slot missing, model expects {} values",
                        self.model_config.numeric_width
                    );
                }
                None
            }
        };

        if inputs.categorical.len() != self.model.categorical_slots() {
            bail!(
                "got {} categorical inputs, model expects {}",
                inputs.categorical.len(),
                self.model.categorical_slots()
            );
        }
        if numeric.is_none() && inputs.categorical.is_empty() {
            bail!("model has no input slots to invoke");
        }

        let categorical: Vec<Tensor<B, 2, Int>> = inputs
            .categorical
            .iter()
            .map(|(_, code)| Tensor::<B, 1, Int>::from_ints([*code], &self.device).unsqueeze())
            .collect();

        let output = self.model.forward(numeric, &categorical);
        output
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| anyhow::anyhow!("model output not readable as floats: {err:?}"))
    }
}

/// Architecture config from the checkpoint's JSON sidecar, falling back to
/// a shape derived from the loaded schema and encoder tables.
fn sidecar_config(
    model_path: &Path,
    schema: &ColumnSchema,
    encoders: &EncoderTables,
) -> IncomeModelConfig {
    let mut sidecar = model_path.as_os_str().to_owned();
    sidecar.push(".config.json");
    let sidecar = PathBuf::from(sidecar);

    if let Some(config) = load_optional_json::<IncomeModelConfig>(&sidecar, "model config sidecar")
    {
        return config;
    }

    IncomeModelConfig {
        numeric_width: schema.numeric_cols.len(),
        vocab_sizes: schema
            .cat_cols
            .iter()
            .map(|col| encoders.get(col).map_or(1, |t| t.classes().len().max(1)))
            .collect(),
        embedding_dim: 8,
        hidden_size_1: 256,
        hidden_size_2: 128,
    }
}

/// Reads and deserializes an optional JSON artifact, warning and returning
/// `None` on any failure so startup proceeds in degraded mode.
fn load_optional_json<T: DeserializeOwned>(path: &Path, what: &str) -> Option<T> {
    let read = std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from));

    match read {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                artifact = what,
                path = %path.display(),
                error = %err,
                "could not load artifact, continuing degraded"
            );
            None
        }
    }
}
