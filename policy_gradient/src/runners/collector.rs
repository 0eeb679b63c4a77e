//! Lock-step episode collection.
//!
//! Every environment of the vectorized env plays exactly one episode per
//! collection. Environments are stepped together; an environment whose
//! episode ended (terminal or step cap) is frozen until all others finish.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use rand::Rng;

use crate::algorithms::action_policy::{sample_categorical, uniform_legal_probs, MaskedPolicyOutput};
use crate::core::{EpisodeEnd, Trajectory, TrajectoryBatch};
use crate::environment::{ActiveMask, VectorizedEnv};
use crate::error::{Result, TrainingError};
use crate::nn::PolicyNetwork;

/// How actions are chosen during collection.
pub enum ActionSource<'a, P> {
    /// Sample from the masked policy distribution.
    Policy(&'a P),
    /// Uniform over legal actions.
    UniformLegal,
}

/// Collects one episode per environment.
#[derive(Debug, Clone)]
pub struct TrajectoryCollector {
    max_episode_steps: usize,
}

impl TrajectoryCollector {
    /// Create a collector. Episodes reaching `max_episode_steps` are truncated.
    pub fn new(max_episode_steps: usize) -> Self {
        Self {
            max_episode_steps: max_episode_steps.max(1),
        }
    }

    pub fn max_episode_steps(&self) -> usize {
        self.max_episode_steps
    }

    /// Reset every environment with `seed` and play one episode in each.
    ///
    /// Episodes are returned in environment order. Only the active
    /// environments are fed through the policy at each step.
    pub fn collect<B, E, P, R>(
        &self,
        env: &mut E,
        source: ActionSource<'_, P>,
        seed: u64,
        rng: &mut R,
        device: &B::Device,
    ) -> Result<TrajectoryBatch>
    where
        B: Backend,
        E: VectorizedEnv,
        P: PolicyNetwork<B>,
        R: Rng + ?Sized,
    {
        let n_envs = env.n_envs();
        let obs_size = env.obs_size();
        let n_actions = env.n_actions();

        if let ActionSource::Policy(policy) = &source {
            check_shapes(obs_size, n_actions, policy.input_size(), policy.n_actions())?;
        }

        env.reset_all(seed);
        let mut obs = env.get_observations();
        let mut masks = vec![0.0f32; n_envs * n_actions];

        let mut trajectories: Vec<Trajectory> = obs
            .chunks_exact(obs_size)
            .map(|o| Trajectory::new(o, n_actions))
            .collect();
        let mut active = ActiveMask::all(n_envs);

        // Environments with no legal move at reset end immediately
        env.write_action_masks(&mut masks);
        for (i, mask) in masks.chunks_exact(n_actions).enumerate() {
            if mask.iter().all(|&m| m == 0.0) {
                finish(&mut trajectories[i], EpisodeEnd::Terminal, env.max_tile(i));
                active.deactivate(i);
            }
        }

        while active.any() {
            let active_envs: Vec<usize> = (0..n_envs).filter(|&i| active.is_active(i)).collect();

            let mut actions = vec![0u32; n_envs];
            let sampled = match &source {
                ActionSource::Policy(policy) => {
                    sample_policy_actions::<B, P, R>(
                        policy,
                        &obs,
                        &masks,
                        &active_envs,
                        obs_size,
                        n_actions,
                        rng,
                        device,
                    )?
                }
                ActionSource::UniformLegal => {
                    let mut probs = vec![0.0f32; n_actions];
                    active_envs
                        .iter()
                        .map(|&i| {
                            uniform_legal_probs(&masks[i * n_actions..(i + 1) * n_actions], &mut probs);
                            sample_categorical(&probs, rng) as u32
                        })
                        .collect()
                }
            };
            for (&i, &a) in active_envs.iter().zip(&sampled) {
                actions[i] = a;
            }

            let result = env.step(&actions, &active);
            let next_obs = env.get_observations();

            for &i in &active_envs {
                let traj = &mut trajectories[i];
                traj.push(
                    &masks[i * n_actions..(i + 1) * n_actions],
                    actions[i],
                    result.rewards[i],
                    &next_obs[i * obs_size..(i + 1) * obs_size],
                );

                let end = if result.terminals[i] {
                    Some(EpisodeEnd::Terminal)
                } else if traj.len() >= self.max_episode_steps {
                    Some(EpisodeEnd::Truncated)
                } else {
                    None
                };
                if let Some(end) = end {
                    finish(traj, end, env.max_tile(i));
                    active.deactivate(i);
                }
            }

            obs = next_obs;
            env.write_action_masks(&mut masks);
        }

        let truncated = trajectories
            .iter()
            .filter(|t| t.end() == Some(EpisodeEnd::Truncated))
            .count();
        if truncated > 0 {
            log::debug!(
                "{} of {} episodes hit the {} step cap",
                truncated,
                n_envs,
                self.max_episode_steps
            );
        }

        Ok(TrajectoryBatch::new(trajectories, obs_size, n_actions))
    }
}

fn finish(traj: &mut Trajectory, end: EpisodeEnd, max_tile: Option<u32>) {
    traj.finish(end);
    traj.set_max_tile(max_tile);
}

pub(crate) fn check_shapes(
    env_obs: usize,
    env_actions: usize,
    model_obs: usize,
    model_actions: usize,
) -> Result<()> {
    if env_obs != model_obs {
        return Err(TrainingError::ShapeMismatch {
            what: "observation size",
            env: env_obs,
            model: model_obs,
        });
    }
    if env_actions != model_actions {
        return Err(TrainingError::ShapeMismatch {
            what: "action count",
            env: env_actions,
            model: model_actions,
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sample_policy_actions<B, P, R>(
    policy: &P,
    obs: &[f32],
    masks: &[f32],
    envs: &[usize],
    obs_size: usize,
    n_actions: usize,
    rng: &mut R,
    device: &B::Device,
) -> Result<Vec<u32>>
where
    B: Backend,
    P: PolicyNetwork<B>,
    R: Rng + ?Sized,
{
    let mut obs_batch = Vec::with_capacity(envs.len() * obs_size);
    let mut mask_batch = Vec::with_capacity(envs.len() * n_actions);
    for &i in envs {
        obs_batch.extend_from_slice(&obs[i * obs_size..(i + 1) * obs_size]);
        mask_batch.extend_from_slice(&masks[i * n_actions..(i + 1) * n_actions]);
    }

    let obs_tensor =
        Tensor::<B, 2>::from_data(TensorData::new(obs_batch, [envs.len(), obs_size]), device);
    let logits = policy.logits(obs_tensor).detach();
    MaskedPolicyOutput::from_mask_data(logits, &mask_batch, device).sample(rng)
}
