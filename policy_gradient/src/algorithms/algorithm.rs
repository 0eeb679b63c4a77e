//! Algorithm selection for the REINFORCE family.
//!
//! The algorithm is chosen once from configuration and determines:
//! - whether the policy is trained at all (`Random` never updates)
//! - whether a value network is trained alongside the policy
//! - how returns and advantages are estimated from a batch
//!
//! | Algorithm | Policy weight | Value target |
//! |---|---|---|
//! | `Random` | - | - |
//! | `Reinforce` | G_t | - |
//! | `ReinforceBaseline` | G_t - V(s_t) | G_t |
//! | `ActorCritic` | r_t + γV(s_{t+1}) - V(s_t) | r_t + γV(s_{t+1}) |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::returns::{baseline_advantages, discounted_returns, normalize_advantages, td_advantages};
use crate::core::TrajectoryBatch;
use crate::runners::config::ConfigError;

/// Policy-gradient variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    /// Uniform over legal actions; no learning. Comparison baseline.
    Random,
    /// Monte Carlo policy gradient.
    #[default]
    Reinforce,
    /// Monte Carlo policy gradient with a learned state-value baseline.
    ReinforceBaseline,
    /// One-step actor-critic with TD advantages.
    ActorCritic,
}

/// Output of the return/advantage estimator for one batch.
#[derive(Debug, Clone, Default)]
pub struct Estimates {
    /// Weights for the policy-gradient loss [T]
    pub advantages: Vec<f32>,
    /// Regression targets for the value network [T], if one is trained
    pub value_targets: Option<Vec<f32>>,
    /// Discounted returns [T], when the estimator computes them
    pub returns: Option<Vec<f32>>,
}

impl AlgorithmKind {
    /// All variants in display order.
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::Random,
        AlgorithmKind::Reinforce,
        AlgorithmKind::ReinforceBaseline,
        AlgorithmKind::ActorCritic,
    ];

    /// Algorithm name for logging.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Random => "random",
            AlgorithmKind::Reinforce => "reinforce",
            AlgorithmKind::ReinforceBaseline => "reinforce-baseline",
            AlgorithmKind::ActorCritic => "actor-critic",
        }
    }

    /// Whether the policy network is updated.
    pub fn trains_policy(self) -> bool {
        !matches!(self, AlgorithmKind::Random)
    }

    /// Whether a value network is trained.
    pub fn uses_value_network(self) -> bool {
        matches!(
            self,
            AlgorithmKind::ReinforceBaseline | AlgorithmKind::ActorCritic
        )
    }

    /// Whether the estimator needs V(s_{t+1}).
    pub fn bootstraps(self) -> bool {
        matches!(self, AlgorithmKind::ActorCritic)
    }

    /// Compute policy weights and value targets for a batch.
    ///
    /// # Arguments
    ///
    /// * `batch` - collected trajectories
    /// * `values` - V(s_t) for every transition, empty unless a value network is used
    /// * `next_values` - V(s_{t+1}) for every transition, empty unless bootstrapping
    /// * `gamma` - discount factor
    /// * `normalize` - normalize the policy weights to zero mean, unit variance
    ///
    /// # Panics
    ///
    /// Panics if `values` or `next_values` do not match the batch length when
    /// the algorithm requires them.
    pub fn estimate(
        self,
        batch: &TrajectoryBatch,
        values: &[f32],
        next_values: &[f32],
        gamma: f32,
        normalize: bool,
    ) -> Estimates {
        let n = batch.len();
        if self.uses_value_network() {
            assert_eq!(values.len(), n, "value estimates must cover the batch");
        }
        if self.bootstraps() {
            assert_eq!(next_values.len(), n, "next-state values must cover the batch");
        }

        let mut estimates = match self {
            AlgorithmKind::Random => Estimates {
                advantages: vec![0.0; n],
                ..Estimates::default()
            },
            AlgorithmKind::Reinforce => {
                let returns = discounted_returns(&batch.rewards(), &batch.episode_ends(), gamma);
                Estimates {
                    advantages: returns.clone(),
                    value_targets: None,
                    returns: Some(returns),
                }
            }
            AlgorithmKind::ReinforceBaseline => {
                let returns = discounted_returns(&batch.rewards(), &batch.episode_ends(), gamma);
                Estimates {
                    advantages: baseline_advantages(&returns, values),
                    value_targets: Some(returns.clone()),
                    returns: Some(returns),
                }
            }
            AlgorithmKind::ActorCritic => {
                let (advantages, targets) =
                    td_advantages(&batch.rewards(), values, next_values, &batch.terminals(), gamma);
                Estimates {
                    advantages,
                    value_targets: Some(targets),
                    returns: None,
                }
            }
        };

        if normalize && self.trains_policy() {
            normalize_advantages(&mut estimates.advantages);
        }
        estimates
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "random" => Ok(AlgorithmKind::Random),
            "reinforce" => Ok(AlgorithmKind::Reinforce),
            "reinforce-baseline" | "baseline" => Ok(AlgorithmKind::ReinforceBaseline),
            "actor-critic" | "ac" | "a2c" => Ok(AlgorithmKind::ActorCritic),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}
