//! Loss functions for the REINFORCE family.
//!
//! Tensor versions are used for gradient computation; the scalar versions
//! mirror them on plain slices for diagnostics and tests.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Policy-gradient loss (scalar computation).
///
/// L = -mean(log π(a_t|s_t) * A_t)
///
/// # Arguments
///
/// * `log_probs` - log probabilities of the taken actions
/// * `weights` - returns or advantages, treated as constants
pub fn policy_gradient_loss_scalar(log_probs: &[f32], weights: &[f32]) -> f32 {
    let n = log_probs.len();
    assert_eq!(weights.len(), n);

    if n == 0 {
        return 0.0;
    }

    let total: f32 = log_probs.iter().zip(weights).map(|(lp, w)| lp * w).sum();
    -total / n as f32
}

/// Policy-gradient loss (tensor computation for gradient).
///
/// # Arguments
///
/// * `log_probs` - log π(a_t|s_t): [batch]
/// * `weights` - returns or advantages (detached): [batch]
///
/// # Returns
///
/// Scalar loss tensor (for backpropagation) - 1D tensor with single element
pub fn policy_gradient_loss<B: Backend>(log_probs: Tensor<B, 1>, weights: Tensor<B, 1>) -> Tensor<B, 1> {
    -(log_probs * weights.detach()).mean()
}

/// Value regression loss (scalar computation).
///
/// L = 0.5 * mean((V(s_t) - target_t)^2)
pub fn value_loss_scalar(values: &[f32], targets: &[f32]) -> f32 {
    let n = values.len();
    assert_eq!(targets.len(), n);

    if n == 0 {
        return 0.0;
    }

    let sum_sq: f32 = values.iter().zip(targets).map(|(v, y)| (v - y).powi(2)).sum();
    0.5 * sum_sq / n as f32
}

/// Value regression loss (tensor computation for gradient).
///
/// # Arguments
///
/// * `values` - current value predictions: [batch]
/// * `targets` - regression targets, discounted returns or TD targets: [batch]
pub fn value_loss<B: Backend>(values: Tensor<B, 1>, targets: Tensor<B, 1>) -> Tensor<B, 1> {
    (values - targets.detach()).powf_scalar(2.0).mean().mul_scalar(0.5)
}

/// Entropy loss for exploration bonus.
///
/// Returns negative mean entropy (minimizing this maximizes entropy).
pub fn entropy_loss<B: Backend>(entropy: Tensor<B, 1>) -> Tensor<B, 1> {
    -entropy.mean()
}
