use std::path::PathBuf;

use clap::Parser;
use policy_gradient::{AlgorithmKind, Architecture, TrainingConfig};

/// Train policy-gradient agents on 2048
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// JSON configuration file; command line options override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// random, reinforce, reinforce-baseline or actor-critic
    #[arg(short, long)]
    pub algorithm: Option<AlgorithmKind>,
    /// Train every algorithm in turn with the same settings
    #[arg(long)]
    pub compare: bool,
    /// Games (episodes) per iteration
    #[arg(short, long)]
    pub batch_size: Option<usize>,
    /// Training iterations
    #[arg(short, long)]
    pub iterations: Option<usize>,
    /// Discount factor in [0, 1)
    #[arg(long)]
    pub gamma: Option<f32>,
    /// Learning rate of both networks
    #[arg(long)]
    pub lr: Option<f64>,
    #[arg(long)]
    pub policy_lr: Option<f64>,
    #[arg(long)]
    pub value_lr: Option<f64>,
    /// Halve the learning rates every N updates
    #[arg(long)]
    pub lr_decay: Option<usize>,
    /// Step cap per episode
    #[arg(long)]
    pub max_episode_steps: Option<usize>,
    /// mlp or conv
    #[arg(long)]
    pub architecture: Option<Architecture>,
    /// Hidden layer widths of MLP networks, comma separated
    #[arg(long, value_delimiter = ',')]
    pub hidden: Option<Vec<usize>>,
    #[arg(long)]
    pub entropy_coef: Option<f32>,
    /// Normalize policy-gradient weights per batch
    #[arg(long)]
    pub normalize_advantages: bool,
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Console log interval in iterations
    #[arg(long)]
    pub log_interval: Option<usize>,
    /// Write per-iteration metrics to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Write a JSON summary of the run(s) to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Apply command line overrides on top of `config`.
    pub fn apply(&self, mut config: TrainingConfig) -> TrainingConfig {
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(lr) = self.lr {
            config = config.with_learning_rate(lr);
        }
        if let Some(lr) = self.policy_lr {
            config.policy_learning_rate = lr;
        }
        if let Some(lr) = self.value_lr {
            config.value_learning_rate = lr;
        }
        if self.lr_decay.is_some() {
            config.lr_decay = self.lr_decay;
        }
        if let Some(steps) = self.max_episode_steps {
            config.max_episode_steps = steps;
        }
        if let Some(architecture) = self.architecture {
            config.architecture = architecture;
        }
        if let Some(hidden) = &self.hidden {
            config.hidden_sizes = hidden.clone();
        }
        if let Some(coef) = self.entropy_coef {
            config.entropy_coef = coef;
        }
        if self.normalize_advantages {
            config.normalize_advantages = true;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(interval) = self.log_interval {
            config.log_interval = interval;
        }
        config
    }
}
