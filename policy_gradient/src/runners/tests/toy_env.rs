//! One-step environment where a single action pays off.

use crate::environment::{ActiveMask, StepResult, VectorizedEnv};

pub const TOY_OBS_SIZE: usize = 2;
pub const TOY_ACTIONS: usize = 4;
pub const REWARDED_ACTION: u32 = 2;

/// Every episode is one step long. `REWARDED_ACTION` earns `hit`, every
/// other action earns `miss`. All actions are legal.
pub struct RewardedActionEnv {
    n_envs: usize,
    hit: f32,
    miss: f32,
    done: Vec<bool>,
}

impl RewardedActionEnv {
    pub fn new(n_envs: usize) -> Self {
        Self::with_rewards(n_envs, 1.0, 0.0)
    }

    pub fn with_rewards(n_envs: usize, hit: f32, miss: f32) -> Self {
        Self {
            n_envs,
            hit,
            miss,
            done: vec![false; n_envs],
        }
    }
}

impl VectorizedEnv for RewardedActionEnv {
    fn n_envs(&self) -> usize {
        self.n_envs
    }

    fn obs_size(&self) -> usize {
        TOY_OBS_SIZE
    }

    fn n_actions(&self) -> usize {
        TOY_ACTIONS
    }

    fn write_observations(&self, buffer: &mut [f32]) {
        for chunk in buffer.chunks_exact_mut(TOY_OBS_SIZE) {
            chunk.copy_from_slice(&[1.0, 0.0]);
        }
    }

    fn write_action_masks(&self, buffer: &mut [f32]) {
        buffer.fill(1.0);
    }

    fn step(&mut self, actions: &[u32], active: &ActiveMask) -> StepResult {
        let mut rewards = vec![0.0; self.n_envs];
        for (i, &a) in actions.iter().enumerate() {
            if !active.is_active(i) {
                continue;
            }
            rewards[i] = if a == REWARDED_ACTION { self.hit } else { self.miss };
            self.done[i] = true;
        }
        StepResult::new(rewards, self.done.clone())
    }

    fn reset_all(&mut self, _seed: u64) {
        self.done.fill(false);
    }
}
