//! Masked categorical policy over the discrete move actions.
//!
//! Illegal actions are removed by adding a large negative constant to their
//! logits before the softmax and then multiplying the probabilities by the
//! mask, so they receive exactly zero probability while every row still sums
//! to one over the legal actions.

use burn::tensor::activation::{log_softmax, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use rand::Rng;

use crate::error::{Result, TrainingError};

/// Logit offset applied to illegal actions.
pub const MASKED_LOGIT: f32 = -1e9;

/// Policy output: raw logits plus the legal-action mask.
#[derive(Clone, Debug)]
pub struct MaskedPolicyOutput<B: Backend> {
    /// Unnormalized log probabilities: [batch, n_actions]
    pub logits: Tensor<B, 2>,
    /// Legal-action mask, 1.0 legal and 0.0 illegal: [batch, n_actions]
    pub mask: Tensor<B, 2>,
}

impl<B: Backend> MaskedPolicyOutput<B> {
    pub fn new(logits: Tensor<B, 2>, mask: Tensor<B, 2>) -> Self {
        debug_assert_eq!(logits.dims(), mask.dims());
        Self { logits, mask }
    }

    /// Build from host-side mask data.
    pub fn from_mask_data(logits: Tensor<B, 2>, mask: &[f32], device: &B::Device) -> Self {
        let [batch, n_actions] = logits.dims();
        let mask = Tensor::<B, 1>::from_floats(mask, device).reshape([batch, n_actions]);
        Self::new(logits, mask)
    }

    pub fn batch_size(&self) -> usize {
        self.logits.dims()[0]
    }

    pub fn n_actions(&self) -> usize {
        self.logits.dims()[1]
    }

    fn masked_logits(&self) -> Tensor<B, 2> {
        let penalty = self.mask.clone().neg().add_scalar(1.0).mul_scalar(MASKED_LOGIT);
        self.logits.clone() + penalty
    }

    /// Action probabilities; illegal actions are exactly zero.
    pub fn probs(&self) -> Tensor<B, 2> {
        softmax(self.masked_logits(), 1) * self.mask.clone()
    }

    /// Log probabilities of all actions (illegal entries are large and negative).
    pub fn log_probs(&self) -> Tensor<B, 2> {
        log_softmax(self.masked_logits(), 1)
    }

    /// Log probability of the taken actions: [batch]
    pub fn action_log_probs(&self, actions: &[u32], device: &B::Device) -> Tensor<B, 1> {
        let batch_size = actions.len();
        let action_indices: Vec<i32> = actions.iter().map(|&a| a as i32).collect();
        let actions_tensor: Tensor<B, 1, Int> = Tensor::from_ints(action_indices.as_slice(), device);
        let actions_2d: Tensor<B, 2, Int> = actions_tensor.reshape([batch_size, 1]);

        self.log_probs().gather(1, actions_2d).flatten(0, 1)
    }

    /// Entropy of the masked distribution: [batch]
    pub fn entropy(&self) -> Tensor<B, 1> {
        let neg_entropy: Tensor<B, 2> = (self.probs() * self.log_probs()).sum_dim(1);
        -neg_entropy.flatten(0, 1)
    }

    /// Sample one action per row.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<u32>> {
        let n_actions = self.n_actions();
        let probs = self
            .probs()
            .into_data()
            .to_vec::<f32>()
            .map_err(TrainingError::tensor_data)?;

        Ok(probs
            .chunks_exact(n_actions)
            .map(|row| sample_categorical(row, rng) as u32)
            .collect())
    }
}

/// Categorical sampling via cumulative sum.
///
/// Zero-probability entries are never selected, even when floating-point
/// error leaves the cumulative sum short of the drawn value.
pub fn sample_categorical<R: Rng + ?Sized>(probs: &[f32], rng: &mut R) -> usize {
    let total: f32 = probs.iter().sum();
    let target = rng.gen::<f32>() * total;

    let mut cumsum = 0.0f32;
    let mut last_positive = 0;
    for (a, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        last_positive = a;
        cumsum += p;
        if target < cumsum {
            return a;
        }
    }
    last_positive
}

/// Uniform distribution over legal actions, written into `out`.
pub fn uniform_legal_probs(mask: &[f32], out: &mut [f32]) {
    debug_assert_eq!(mask.len(), out.len());
    let legal: f32 = mask.iter().sum();
    for (p, &m) in out.iter_mut().zip(mask) {
        *p = if legal > 0.0 { m / legal } else { 0.0 };
    }
}
