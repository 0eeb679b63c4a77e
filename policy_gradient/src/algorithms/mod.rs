//! Algorithm components for policy-gradient training.
//!
//! - `returns`: discounted returns, baseline and TD advantages
//! - `action_policy`: masked categorical distribution and sampling
//! - `policy_loss`: policy-gradient, value and entropy losses
//! - `algorithm`: algorithm selection and the matching estimator

pub mod action_policy;
pub mod algorithm;
pub mod policy_loss;
pub mod returns;

#[cfg(test)]
mod tests;

pub use action_policy::{sample_categorical, uniform_legal_probs, MaskedPolicyOutput, MASKED_LOGIT};
pub use algorithm::{AlgorithmKind, Estimates};
pub use policy_loss::{
    entropy_loss, policy_gradient_loss, policy_gradient_loss_scalar, value_loss, value_loss_scalar,
};
pub use returns::{
    baseline_advantages, discounted_returns, normalize_advantages, td_advantages, td_targets,
};
