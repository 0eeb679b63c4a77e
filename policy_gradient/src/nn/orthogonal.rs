//! Orthogonal initialization for linear layers.
//!
//! Weights are drawn from a standard normal, orthonormalized with modified
//! Gram-Schmidt on the host and scaled by a gain. Generation is driven by a
//! seeded `StdRng`, so two layers built from the same seed are identical.
//!
//! # Gain Values
//!
//! - 1.0: Linear/Identity activations (value heads)
//! - sqrt(2) ≈ 1.41: ReLU activations
//! - 0.01: policy heads, keeps the initial policy near uniform

use burn::module::{Module, Param};
use burn::prelude::*;
use burn::tensor::TensorData;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Configuration for OrthogonalLinear layer.
#[derive(Debug, Clone)]
pub struct OrthogonalLinearConfig {
    /// Number of input features.
    pub d_input: usize,
    /// Number of output features.
    pub d_output: usize,
    /// Gain factor for scaling the orthogonal weights.
    pub gain: f64,
    /// Whether to include a bias term.
    pub bias: bool,
    /// Seed for weight generation.
    pub seed: u64,
}

impl OrthogonalLinearConfig {
    /// Create a new configuration.
    pub fn new(d_input: usize, d_output: usize) -> Self {
        Self {
            d_input,
            d_output,
            gain: 1.0,
            bias: true,
            seed: 0,
        }
    }

    /// Set the gain factor.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Set whether to include bias.
    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Initialize the layer.
    pub fn init<B: Backend>(&self, device: &B::Device) -> OrthogonalLinear<B> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let values = orthogonal_matrix(self.d_output, self.d_input, self.gain, &mut rng);
        let weight = Tensor::<B, 2>::from_data(
            TensorData::new(values, [self.d_output, self.d_input]),
            device,
        );

        let bias = if self.bias {
            Some(Param::from_tensor(Tensor::zeros([self.d_output], device)))
        } else {
            None
        };

        OrthogonalLinear {
            weight: Param::from_tensor(weight),
            bias,
        }
    }
}

/// Linear layer with orthogonal initialization.
#[derive(Module, Debug)]
pub struct OrthogonalLinear<B: Backend> {
    /// Weight matrix of shape [d_output, d_input]
    pub weight: Param<Tensor<B, 2>>,
    /// Optional bias of shape [d_output]
    pub bias: Option<Param<Tensor<B, 1>>>,
}

impl<B: Backend> OrthogonalLinear<B> {
    /// Forward pass: y = xW^T + b
    ///
    /// # Arguments
    /// * `input` - Tensor of shape [batch_size, d_input]
    ///
    /// # Returns
    /// Tensor of shape [batch_size, d_output]
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let output = input.matmul(self.weight.val().transpose());

        match &self.bias {
            Some(bias) => output + bias.val().unsqueeze_dim(0),
            None => output,
        }
    }

    pub fn d_input(&self) -> usize {
        self.weight.val().dims()[1]
    }

    pub fn d_output(&self) -> usize {
        self.weight.val().dims()[0]
    }
}

/// Row-major `[rows, cols]` matrix with orthonormal rows (wide) or columns (tall).
pub fn orthogonal_matrix(rows: usize, cols: usize, gain: f64, rng: &mut StdRng) -> Vec<f32> {
    // Orthonormalize vectors of length `len`; there are `count <= len` of them.
    let (count, len) = if rows >= cols { (cols, rows) } else { (rows, cols) };

    let mut vectors: Vec<Vec<f64>> = (0..count)
        .map(|_| (0..len).map(|_| StandardNormal.sample(rng)).collect())
        .collect();

    for i in 0..count {
        loop {
            let (done, rest) = vectors.split_at_mut(i);
            let v = &mut rest[0];
            for u in done.iter() {
                let dot: f64 = v.iter().zip(u).map(|(a, b)| a * b).sum();
                for (a, b) in v.iter_mut().zip(u) {
                    *a -= dot * b;
                }
            }
            let norm = v.iter().map(|a| a * a).sum::<f64>().sqrt();
            if norm > 1e-10 {
                v.iter_mut().for_each(|a| *a /= norm);
                break;
            }
            // Linearly dependent draw; resample
            *v = (0..len).map(|_| StandardNormal.sample(rng)).collect();
        }
    }

    let mut out = vec![0.0f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            let value = if rows >= cols { vectors[c][r] } else { vectors[r][c] };
            out[r * cols + c] = (value * gain) as f32;
        }
    }
    out
}
