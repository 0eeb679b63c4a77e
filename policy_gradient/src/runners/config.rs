//! Training configuration.
//!
//! Configurations are built with `with_*` methods or loaded from JSON, and
//! must pass [`TrainingConfig::validate`] before a [`Trainer`](super::Trainer)
//! accepts them. Missing JSON fields take their default values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithms::AlgorithmKind;
use crate::nn::Architecture;

/// Configuration validation error.
///
/// Returned when configuration parameters are invalid or inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count parameter (batch_size, iterations, etc.) must be positive.
    #[error("{field} must be > 0, got {value}")]
    InvalidCount { field: &'static str, value: usize },

    /// A parameter is outside its valid range.
    #[error("{field} must be in {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("unknown algorithm '{0}' (expected random, reinforce, reinforce-baseline or actor-critic)")]
    UnknownAlgorithm(String),

    #[error("unknown architecture '{0}' (expected mlp or conv)")]
    UnknownArchitecture(String),

    /// The vectorized environment does not run `batch_size` games.
    #[error("batch_size is {batch_size} but the environment runs {n_envs} games")]
    BatchSizeMismatch { batch_size: usize, n_envs: usize },

    /// The algorithm trains a value network but none was provided.
    #[error("{0} requires a value network")]
    MissingValueNetwork(&'static str),

    /// The configuration file could not be read.
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },

    /// The configuration file is not valid JSON for this schema.
    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

/// Configuration for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Policy-gradient variant
    pub algorithm: AlgorithmKind,
    /// Episodes (parallel environments) collected per iteration
    pub batch_size: usize,
    /// Discount factor γ in [0, 1)
    pub gamma: f32,
    /// Adam learning rate of the policy network
    pub policy_learning_rate: f64,
    /// Adam learning rate of the value network
    pub value_learning_rate: f64,
    /// Halve the learning rates every this many optimizer steps
    pub lr_decay: Option<usize>,
    /// Global gradient norm clip
    pub max_grad_norm: f32,
    /// Number of training iterations
    pub iterations: usize,
    /// Step cap per episode; capped episodes count as truncated
    pub max_episode_steps: usize,
    pub architecture: Architecture,
    /// Hidden widths of MLP networks
    pub hidden_sizes: Vec<usize>,
    /// Output channels of the two convolutions
    pub conv_channels: [usize; 2],
    /// Width of the fully connected layer of the conv network
    pub conv_hidden_size: usize,
    /// Entropy bonus coefficient (0 disables)
    pub entropy_coef: f32,
    /// Normalize policy-gradient weights per batch
    pub normalize_advantages: bool,
    /// Seed for environments, action sampling and network initialization
    pub seed: u64,
    /// Log every this many iterations
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::Reinforce,
            batch_size: 32,
            gamma: 0.99,
            policy_learning_rate: 1e-3,
            value_learning_rate: 1e-3,
            lr_decay: None,
            max_grad_norm: 10.0,
            iterations: 1000,
            max_episode_steps: 5000,
            architecture: Architecture::Mlp,
            hidden_sizes: vec![256, 256],
            conv_channels: [64, 128],
            conv_hidden_size: 256,
            entropy_coef: 0.0,
            normalize_advantages: false,
            seed: 42,
            log_interval: 1,
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set both learning rates.
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.policy_learning_rate = lr;
        self.value_learning_rate = lr;
        self
    }

    pub fn with_policy_learning_rate(mut self, lr: f64) -> Self {
        self.policy_learning_rate = lr;
        self
    }

    pub fn with_value_learning_rate(mut self, lr: f64) -> Self {
        self.value_learning_rate = lr;
        self
    }

    pub fn with_lr_decay(mut self, halving_steps: Option<usize>) -> Self {
        self.lr_decay = halving_steps;
        self
    }

    pub fn with_max_grad_norm(mut self, max_grad_norm: f32) -> Self {
        self.max_grad_norm = max_grad_norm;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_max_episode_steps(mut self, steps: usize) -> Self {
        self.max_episode_steps = steps;
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: Vec<usize>) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    pub fn with_conv_channels(mut self, conv_channels: [usize; 2]) -> Self {
        self.conv_channels = conv_channels;
        self
    }

    pub fn with_conv_hidden_size(mut self, size: usize) -> Self {
        self.conv_hidden_size = size;
        self
    }

    pub fn with_entropy_coef(mut self, coef: f32) -> Self {
        self.entropy_coef = coef;
        self
    }

    pub fn with_normalize_advantages(mut self, normalize: bool) -> Self {
        self.normalize_advantages = normalize;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    /// Validate all configuration parameters.
    ///
    /// # Validation Rules
    /// - Count parameters (batch_size, iterations, etc.) must be > 0
    /// - gamma must be in [0, 1)
    /// - learning rates and max_grad_norm must be finite and > 0
    /// - entropy_coef must be finite and >= 0
    /// - every hidden layer must have at least one unit
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("batch_size", self.batch_size),
            ("iterations", self.iterations),
            ("max_episode_steps", self.max_episode_steps),
            ("log_interval", self.log_interval),
            ("conv_hidden_size", self.conv_hidden_size),
            ("conv_channels", self.conv_channels[0].min(self.conv_channels[1])),
            ("hidden_sizes", self.hidden_sizes.len()),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::InvalidCount { field, value });
            }
        }
        if self.hidden_sizes.contains(&0) {
            return Err(ConfigError::InvalidCount {
                field: "hidden layer width",
                value: 0,
            });
        }
        if self.lr_decay == Some(0) {
            return Err(ConfigError::InvalidCount {
                field: "lr_decay",
                value: 0,
            });
        }

        if !(0.0..1.0).contains(&self.gamma) {
            return Err(ConfigError::OutOfRange {
                field: "gamma",
                value: f64::from(self.gamma),
                expected: "[0, 1)",
            });
        }

        let positives = [
            ("policy_learning_rate", self.policy_learning_rate),
            ("value_learning_rate", self.value_learning_rate),
            ("max_grad_norm", f64::from(self.max_grad_norm)),
        ];
        for (field, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    expected: "(0, inf)",
                });
            }
        }

        if !self.entropy_coef.is_finite() || self.entropy_coef < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "entropy_coef",
                value: f64::from(self.entropy_coef),
                expected: "[0, inf)",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(TrainingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = TrainingConfig::new().with_batch_size(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCount {
                field: "batch_size",
                value: 0
            })
        );
    }

    #[test]
    fn test_gamma_range() {
        assert!(TrainingConfig::new().with_gamma(0.0).validate().is_ok());
        assert!(TrainingConfig::new().with_gamma(0.999).validate().is_ok());
        for gamma in [1.0, 1.5, -0.1, f32::NAN] {
            let result = TrainingConfig::new().with_gamma(gamma).validate();
            assert!(
                matches!(result, Err(ConfigError::OutOfRange { field: "gamma", .. })),
                "gamma {} accepted",
                gamma
            );
        }
    }

    #[test]
    fn test_learning_rate_must_be_positive() {
        let result = TrainingConfig::new().with_value_learning_rate(0.0).validate();
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange {
                field: "value_learning_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_hidden_layers_validated() {
        assert!(TrainingConfig::new().with_hidden_sizes(vec![]).validate().is_err());
        assert!(TrainingConfig::new().with_hidden_sizes(vec![64, 0]).validate().is_err());
        assert!(TrainingConfig::new().with_lr_decay(Some(0)).validate().is_err());
    }

    #[test]
    fn test_json_partial_config_uses_defaults() {
        let config =
            TrainingConfig::from_json(r#"{ "algorithm": "actor-critic", "batch_size": 200 }"#).unwrap();
        assert_eq!(config.algorithm, AlgorithmKind::ActorCritic);
        assert_eq!(config.batch_size, 200);
        assert_eq!(config.gamma, TrainingConfig::default().gamma);
    }

    #[test]
    fn test_json_unknown_algorithm_rejected() {
        let result = TrainingConfig::from_json(r#"{ "algorithm": "ppo" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = TrainingConfig::new()
            .with_algorithm(AlgorithmKind::ReinforceBaseline)
            .with_architecture(Architecture::Conv)
            .with_lr_decay(Some(500));
        let parsed = TrainingConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = TrainingConfig::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
