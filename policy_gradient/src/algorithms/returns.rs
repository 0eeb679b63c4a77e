//! Return and advantage estimators for the REINFORCE family.
//!
//! - Discounted return (REINFORCE): G_t = Σ_k γ^k r_{t+k}
//! - Baseline-subtracted return: A_t = G_t - V(s_t)
//! - One-step TD advantage (actor-critic): A_t = r_t + γ V(s_{t+1}) - V(s_t)
//!
//! All functions operate on episodes concatenated in time order. Episode
//! boundaries are carried by the `dones` flags, so a batch of several
//! trajectories can be processed in one pass.

/// Compute discounted returns for concatenated episodes.
///
/// Scans backward with `G_t = r_t + γ G_{t+1} (1 - done_t)`, so the return
/// restarts at every step flagged `done`.
///
/// # Arguments
///
/// * `rewards` - rewards received [T]
/// * `dones` - episode boundary flags [T]
/// * `gamma` - discount factor
///
/// # Returns
///
/// Discounted returns [T]
pub fn discounted_returns(rewards: &[f32], dones: &[bool], gamma: f32) -> Vec<f32> {
    let n = rewards.len();
    assert_eq!(dones.len(), n);

    let mut returns = vec![0.0f32; n];
    let mut running = 0.0f32;

    for t in (0..n).rev() {
        let not_done = if dones[t] { 0.0 } else { 1.0 };
        running = rewards[t] + gamma * running * not_done;
        returns[t] = running;
    }

    returns
}

/// Baseline-subtracted advantages `A_t = G_t - V(s_t)`.
pub fn baseline_advantages(returns: &[f32], values: &[f32]) -> Vec<f32> {
    assert_eq!(returns.len(), values.len());
    returns.iter().zip(values).map(|(g, v)| g - v).collect()
}

/// One-step TD targets `r_t + γ V(s_{t+1}) (1 - terminal_t)`.
///
/// Only true terminals suppress the bootstrap. A step cut by the step cap
/// still bootstraps from the value of the state it reached.
///
/// # Arguments
///
/// * `rewards` - rewards received [T]
/// * `next_values` - value estimates V(s_{t+1}) [T]
/// * `terminals` - terminal flags [T]
/// * `gamma` - discount factor
pub fn td_targets(rewards: &[f32], next_values: &[f32], terminals: &[bool], gamma: f32) -> Vec<f32> {
    let n = rewards.len();
    assert_eq!(next_values.len(), n);
    assert_eq!(terminals.len(), n);

    rewards
        .iter()
        .zip(next_values)
        .zip(terminals)
        .map(|((&r, &next_v), &terminal)| {
            let not_terminal = if terminal { 0.0 } else { 1.0 };
            r + gamma * next_v * not_terminal
        })
        .collect()
}

/// One-step TD advantages (TD errors) and their targets.
///
/// # Returns
///
/// (advantages, targets) - both [T]
pub fn td_advantages(
    rewards: &[f32],
    values: &[f32],
    next_values: &[f32],
    terminals: &[bool],
    gamma: f32,
) -> (Vec<f32>, Vec<f32>) {
    assert_eq!(values.len(), rewards.len());
    let targets = td_targets(rewards, next_values, terminals, gamma);
    let advantages = targets.iter().zip(values).map(|(y, v)| y - v).collect();
    (advantages, targets)
}

/// Normalize advantages to zero mean and unit variance.
pub fn normalize_advantages(advantages: &mut [f32]) {
    if advantages.is_empty() {
        return;
    }

    // Single element: can't compute meaningful variance, zero-center
    if advantages.len() == 1 {
        advantages[0] = 0.0;
        return;
    }

    let n = advantages.len() as f32;
    let mean = advantages.iter().sum::<f32>() / n;
    let variance = advantages.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n;
    let std = (variance + 1e-8).sqrt();

    for a in advantages.iter_mut() {
        *a = (*a - mean) / std;
    }
}
