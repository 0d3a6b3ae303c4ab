//! The pretrained income ANN.
//!
//! A small feedforward network: one embedding per categorical column, the
//! embeddings concatenated with the scaled numeric array and pushed through
//! two hidden layers to a single scalar. The architecture itself is an
//! inference-only handle here; training happened elsewhere and the weights
//! arrive as a burn named-MessagePack checkpoint.

use std::path::Path;

use burn::nn::{Embedding, EmbeddingConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use serde::{Deserialize, Serialize};

/// Architecture hyper-parameters, stored as a JSON sidecar next to the
/// checkpoint (`<checkpoint>.config.json`). Must describe the trained
/// network exactly or the checkpoint will not load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeModelConfig {
    /// Width of the numeric input slot (|numeric columns|).
    pub numeric_width: usize,
    /// Vocabulary size per categorical column, in trained column order.
    pub vocab_sizes: Vec<usize>,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    #[serde(default = "default_hidden_size_1")]
    pub hidden_size_1: usize,
    #[serde(default = "default_hidden_size_2")]
    pub hidden_size_2: usize,
}

const fn default_embedding_dim() -> usize {
    8
}

const fn default_hidden_size_1() -> usize {
    256
}

const fn default_hidden_size_2() -> usize {
    128
}

impl IncomeModelConfig {
    /// Initializes the network with fresh weights on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> IncomeModel<B> {
        let embeddings = self
            .vocab_sizes
            .iter()
            .map(|&vocab| EmbeddingConfig::new(vocab.max(1), self.embedding_dim).init(device))
            .collect();

        let input_width = self.numeric_width + self.vocab_sizes.len() * self.embedding_dim;
        IncomeModel {
            embeddings,
            linear1: LinearConfig::new(input_width, self.hidden_size_1).init(device),
            linear2: LinearConfig::new(self.hidden_size_1, self.hidden_size_2).init(device),
            linear_out: LinearConfig::new(self.hidden_size_2, 1).init(device),
            activation: Relu::new(),
        }
    }
}

/// The income prediction network.
#[derive(Module, Debug)]
pub struct IncomeModel<B: Backend> {
    embeddings: Vec<Embedding<B>>,
    linear1: Linear<B>,
    linear2: Linear<B>,
    linear_out: Linear<B>,
    activation: Relu,
}

impl<B: Backend> IncomeModel<B> {
    /// Forward pass.
    ///
    /// # Arguments
    ///
    /// * `numeric` - optional tensor of shape [`batch_size`, `numeric_width`]
    /// * `categorical` - one [`batch_size`, 1] int tensor per categorical
    ///   column, in trained column order
    ///
    /// # Returns
    ///
    /// Tensor of shape [`batch_size`, 1] with the predicted income.
    ///
    /// # Panics
    ///
    /// Panics on input shapes that do not match the architecture; callers
    /// go through [`crate::ArtifactRegistry::invoke`], which validates
    /// shapes first.
    pub fn forward(
        &self,
        numeric: Option<Tensor<B, 2>>,
        categorical: &[Tensor<B, 2, Int>],
    ) -> Tensor<B, 2> {
        let mut parts: Vec<Tensor<B, 2>> = Vec::with_capacity(1 + self.embeddings.len());
        if let Some(numeric) = numeric {
            parts.push(numeric);
        }
        for (embedding, codes) in self.embeddings.iter().zip(categorical) {
            // [batch, 1] codes -> [batch, 1, dim] -> [batch, dim]
            parts.push(embedding.forward(codes.clone()).flatten::<2>(1, 2));
        }

        let x = Tensor::cat(parts, 1);
        let x = self.linear1.forward(x);
        let x = self.activation.forward(x);
        let x = self.linear2.forward(x);
        let x = self.activation.forward(x);
        self.linear_out.forward(x)
    }

    /// Number of categorical input slots the network was built with.
    pub fn categorical_slots(&self) -> usize {
        self.embeddings.len()
    }
}

/// Loads trained weights from a burn named-MessagePack checkpoint.
///
/// # Errors
///
/// Returns an error if the checkpoint cannot be read or does not match the
/// configured architecture.
pub fn load_checkpoint<B: Backend>(
    path: &Path,
    config: &IncomeModelConfig,
    device: &B::Device,
) -> anyhow::Result<IncomeModel<B>> {
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder.load(path.to_path_buf(), device)?;
    Ok(config.init(device).load_record(record))
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    type TestBackend = NdArray;

    fn config() -> IncomeModelConfig {
        IncomeModelConfig {
            numeric_width: 3,
            vocab_sizes: vec![4, 2],
            embedding_dim: 4,
            hidden_size_1: 16,
            hidden_size_2: 8,
        }
    }

    #[test]
    fn forward_produces_a_single_scalar_per_row() {
        let device = Default::default();
        let model: IncomeModel<TestBackend> = config().init(&device);

        let numeric = Tensor::<TestBackend, 1>::from_floats([0.5, -1.0, 2.0], &device).unsqueeze();
        let cats = vec![
            Tensor::<TestBackend, 1, Int>::from_ints([3], &device).unsqueeze(),
            Tensor::<TestBackend, 1, Int>::from_ints([0], &device).unsqueeze(),
        ];

        let output = model.forward(Some(numeric), &cats);
        assert_eq!(output.dims(), [1, 1]);
    }

    #[test]
    fn forward_works_without_numeric_slot() {
        let device = Default::default();
        let model: IncomeModel<TestBackend> = IncomeModelConfig {
            numeric_width: 0,
            vocab_sizes: vec![2],
            embedding_dim: 4,
            hidden_size_1: 8,
            hidden_size_2: 4,
        }
        .init(&device);

        let cats = vec![Tensor::<TestBackend, 1, Int>::from_ints([1], &device).unsqueeze()];
        let output = model.forward(None, &cats);
        assert_eq!(output.dims(), [1, 1]);
    }

    #[test]
    fn config_sidecar_defaults_apply() {
        let config: IncomeModelConfig =
            serde_json::from_str(r#"{"numeric_width": 5, "vocab_sizes": [3]}"#).unwrap();
        assert_eq!(config.embedding_dim, 8);
        assert_eq!(config.hidden_size_1, 256);
        assert_eq!(config.hidden_size_2, 128);
    }
}
