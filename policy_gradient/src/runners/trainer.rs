//! Training loop.
//!
//! ```text
//! Running { iteration } ──step()──► Running { iteration + 1 } ──...──► Done
//!        │
//!        └─ collect ──► estimate ──► update ──► log
//! ```
//!
//! The trainer owns the networks, the optimizers and the environment. Each
//! call to [`Trainer::step`] runs exactly one iteration; [`Trainer::run`]
//! steps until the configured number of iterations is reached.

use std::time::{Duration, Instant};

use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{Tensor, TensorData};
use game2048_env::{BOARD_SIZE, NUM_ACTIONS, NUM_CHANNELS, OBSERVATION_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::algorithms::AlgorithmKind;
use crate::core::TrajectoryBatch;
use crate::environment::VectorizedEnv;
use crate::error::{Result, TrainingError};
use crate::metrics::{EpisodeStats, MetricsLogger, RecentReturns, TrainingSnapshot};
use crate::nn::{
    BoardConvNet, BoardConvNetConfig, Mlp, MlpConfig, PolicyNetwork, ValueNetwork, POLICY_GAIN,
    VALUE_GAIN,
};
use crate::runners::collector::{check_shapes, ActionSource, TrajectoryCollector};
use crate::runners::config::{ConfigError, TrainingConfig};
use crate::runners::optimizer::{to_host, NetworkUpdate, Networks, UpdateBatch, UpdateStats};

/// Seed offset separating value-network initialization from the policy's.
const VALUE_SEED_OFFSET: u64 = 1_000;

/// Training loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// The next call to `step` runs `iteration`.
    Running { iteration: usize },
    Done,
}

/// Summary of one training iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    /// Environment steps collected this iteration
    pub env_steps: usize,
    pub episodes: EpisodeStats,
    /// Mean return over the last 100 episodes
    pub recent_mean_return: f32,
    pub update: UpdateStats,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub algorithm: AlgorithmKind,
    pub history: Vec<IterationStats>,
    pub total_env_steps: usize,
    pub total_episodes: usize,
    pub elapsed: Duration,
}

impl TrainingReport {
    /// Mean episode return of every iteration, for plotting.
    pub fn mean_returns(&self) -> Vec<f32> {
        self.history.iter().map(|s| s.episodes.mean_return).collect()
    }

    /// Mean return over the last `window` iterations.
    pub fn final_mean_return(&self, window: usize) -> Option<f32> {
        let window = window.max(1).min(self.history.len());
        if window == 0 {
            return None;
        }
        let tail = &self.history[self.history.len() - window..];
        Some(tail.iter().map(|s| s.episodes.mean_return).sum::<f32>() / window as f32)
    }

    /// Largest tile reached during the run.
    pub fn best_tile(&self) -> u32 {
        self.history
            .iter()
            .map(|s| s.episodes.max_tile)
            .max()
            .unwrap_or(0)
    }
}

/// Policy-gradient trainer.
///
/// # Type Parameters
///
/// - `B`: Autodiff backend (e.g. `Autodiff<NdArray>`)
/// - `E`: Vectorized environment, one game per batch element
/// - `P`: Policy network
/// - `V`: Value network (unused by `Random` and `Reinforce`)
pub struct Trainer<B, E, P, V>
where
    B: AutodiffBackend,
    E: VectorizedEnv,
    P: PolicyNetwork<B> + AutodiffModule<B>,
    V: ValueNetwork<B> + AutodiffModule<B>,
{
    config: TrainingConfig,
    env: E,
    networks: Networks<P, V>,
    update: NetworkUpdate<B, P, V>,
    collector: TrajectoryCollector,
    rng: StdRng,
    device: B::Device,
    state: TrainingState,
    history: Vec<IterationStats>,
    total_env_steps: usize,
    total_episodes: usize,
    recent_returns: RecentReturns,
    logger: Option<Box<dyn MetricsLogger>>,
    start_time: Instant,
}

impl<B, E, P, V> Trainer<B, E, P, V>
where
    B: AutodiffBackend,
    E: VectorizedEnv,
    P: PolicyNetwork<B> + AutodiffModule<B>,
    V: ValueNetwork<B> + AutodiffModule<B>,
{
    /// Create a trainer.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::Config`] if the configuration is invalid, the
    ///   environment count differs from `batch_size`, or the algorithm needs
    ///   a value network that was not provided
    /// - [`TrainingError::ShapeMismatch`] if a network does not fit the environment
    pub fn new(config: TrainingConfig, env: E, networks: Networks<P, V>, device: B::Device) -> Result<Self> {
        config.validate()?;

        if env.n_envs() != config.batch_size {
            return Err(ConfigError::BatchSizeMismatch {
                batch_size: config.batch_size,
                n_envs: env.n_envs(),
            }
            .into());
        }
        if config.algorithm.uses_value_network() && networks.value.is_none() {
            return Err(ConfigError::MissingValueNetwork(config.algorithm.name()).into());
        }

        check_shapes(
            env.obs_size(),
            env.n_actions(),
            networks.policy.input_size(),
            networks.policy.n_actions(),
        )?;
        if let Some(value) = &networks.value {
            if value.input_size() != env.obs_size() {
                return Err(TrainingError::ShapeMismatch {
                    what: "observation size",
                    env: env.obs_size(),
                    model: value.input_size(),
                });
            }
        }

        log::info!(
            "training {} for {} iterations, batch_size={}, gamma={}",
            config.algorithm,
            config.iterations,
            config.batch_size,
            config.gamma
        );

        Ok(Self {
            update: NetworkUpdate::new(&config),
            collector: TrajectoryCollector::new(config.max_episode_steps),
            rng: StdRng::seed_from_u64(config.seed),
            state: TrainingState::Running { iteration: 0 },
            history: Vec::with_capacity(config.iterations),
            total_env_steps: 0,
            total_episodes: 0,
            recent_returns: RecentReturns::default(),
            logger: None,
            start_time: Instant::now(),
            config,
            env,
            networks,
            device,
        })
    }

    /// Attach a metrics logger that receives one snapshot per iteration.
    pub fn with_logger(mut self, logger: impl MetricsLogger + 'static) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn networks(&self) -> &Networks<P, V> {
        &self.networks
    }

    /// Consume the trainer, returning the trained networks.
    pub fn into_networks(self) -> Networks<P, V> {
        self.networks
    }

    pub fn history(&self) -> &[IterationStats] {
        &self.history
    }

    /// Run one iteration.
    ///
    /// Returns `Ok(None)` once the trainer is `Done`.
    pub fn step(&mut self) -> Result<Option<IterationStats>> {
        let iteration = match self.state {
            TrainingState::Running { iteration } => iteration,
            TrainingState::Done => return Ok(None),
        };
        let algorithm = self.config.algorithm;

        // Fresh games every iteration
        let seed = self
            .config
            .seed
            .wrapping_add((iteration as u64).wrapping_mul(self.env.n_envs() as u64));
        let source = if algorithm.trains_policy() {
            ActionSource::Policy(&self.networks.policy)
        } else {
            ActionSource::UniformLegal
        };
        let batch = self
            .collector
            .collect::<B, E, P, StdRng>(&mut self.env, source, seed, &mut self.rng, &self.device)?;

        let update = if algorithm == AlgorithmKind::Random || batch.is_empty() {
            UpdateStats::default()
        } else {
            self.update_networks(&batch, iteration)?
        };

        let episodes = EpisodeStats::from_batch(&batch);
        self.recent_returns.extend(&batch.episode_returns());
        self.total_env_steps += batch.len();
        self.total_episodes += batch.n_episodes();

        let stats = IterationStats {
            iteration,
            env_steps: batch.len(),
            episodes,
            recent_mean_return: self.recent_returns.mean(),
            update,
        };
        self.log(&stats);
        self.history.push(stats.clone());

        self.state = if iteration + 1 >= self.config.iterations {
            TrainingState::Done
        } else {
            TrainingState::Running {
                iteration: iteration + 1,
            }
        };

        Ok(Some(stats))
    }

    /// Step until `Done` and return the run summary.
    pub fn run(&mut self) -> Result<TrainingReport> {
        while self.step()?.is_some() {}

        if let Some(logger) = self.logger.as_mut() {
            logger.flush();
        }

        let report = self.report();
        log::info!(
            "finished {}: {} episodes, {} env steps, best tile {}, {:.1}s",
            report.algorithm,
            report.total_episodes,
            report.total_env_steps,
            report.best_tile(),
            report.elapsed.as_secs_f32()
        );
        Ok(report)
    }

    /// Summary of the iterations run so far.
    pub fn report(&self) -> TrainingReport {
        TrainingReport {
            algorithm: self.config.algorithm,
            history: self.history.clone(),
            total_env_steps: self.total_env_steps,
            total_episodes: self.total_episodes,
            elapsed: self.start_time.elapsed(),
        }
    }

    fn update_networks(&mut self, batch: &TrajectoryBatch, iteration: usize) -> Result<UpdateStats> {
        let algorithm = self.config.algorithm;
        let n = batch.len();
        let obs_size = batch.obs_size();

        let observations = Tensor::<B, 2>::from_data(
            TensorData::new(batch.observations(), [n, obs_size]),
            &self.device,
        );

        let (values, next_values) = match &self.networks.value {
            Some(value) if algorithm.uses_value_network() => {
                let values = to_host(value.values(observations.clone()).detach())?;
                let next_values = if algorithm.bootstraps() {
                    let next_obs = Tensor::<B, 2>::from_data(
                        TensorData::new(batch.next_observations(), [n, obs_size]),
                        &self.device,
                    );
                    to_host(value.values(next_obs).detach())?
                } else {
                    Vec::new()
                };
                (values, next_values)
            }
            _ => (Vec::new(), Vec::new()),
        };

        let estimates = algorithm.estimate(
            batch,
            &values,
            &next_values,
            self.config.gamma,
            self.config.normalize_advantages,
        );

        let action_masks = batch.action_masks();
        let actions = batch.actions();
        let update_batch = UpdateBatch {
            observations,
            action_masks: &action_masks,
            actions: &actions,
            advantages: Some(&estimates.advantages),
            value_targets: estimates.value_targets.as_deref(),
        };

        self.update
            .apply(&mut self.networks, update_batch, iteration, &self.device)
    }

    fn log(&mut self, stats: &IterationStats) {
        log::debug!(
            "iteration {}: {} episodes, mean return {:.1}, {} steps",
            stats.iteration,
            stats.episodes.episodes,
            stats.episodes.mean_return,
            stats.env_steps
        );

        if let Some(logger) = self.logger.as_mut() {
            let snapshot = TrainingSnapshot::new(
                stats.iteration,
                self.total_env_steps,
                self.total_episodes,
                stats.episodes,
            )
            .with_recent_mean_return(stats.recent_mean_return)
            .with_losses(
                stats.update.policy_loss,
                stats.update.value_loss,
                stats.update.entropy,
            )
            .with_learning_rates(
                stats.update.policy_learning_rate,
                stats.update.value_learning_rate,
            );
            logger.log(&snapshot);
        }
    }
}

/// MLP policy and value networks for 2048, sized and seeded from the configuration.
///
/// The value network is only built when the algorithm trains one.
pub fn build_mlp_networks<B: AutodiffBackend>(
    config: &TrainingConfig,
    device: &B::Device,
) -> Networks<Mlp<B>, Mlp<B>> {
    let policy = MlpConfig::new(OBSERVATION_SIZE, NUM_ACTIONS)
        .with_hidden_sizes(config.hidden_sizes.clone())
        .with_output_gain(POLICY_GAIN)
        .with_seed(config.seed)
        .init(device);

    let value = config.algorithm.uses_value_network().then(|| {
        MlpConfig::new(OBSERVATION_SIZE, 1)
            .with_hidden_sizes(config.hidden_sizes.clone())
            .with_output_gain(VALUE_GAIN)
            .with_seed(config.seed.wrapping_add(VALUE_SEED_OFFSET))
            .init(device)
    });

    Networks::new(policy, value)
}

/// Convolutional policy and value networks for 2048.
pub fn build_conv_networks<B: AutodiffBackend>(
    config: &TrainingConfig,
    device: &B::Device,
) -> Networks<BoardConvNet<B>, BoardConvNet<B>> {
    let base = |output_size: usize| {
        BoardConvNetConfig::new(BOARD_SIZE, NUM_CHANNELS, output_size)
            .with_conv_channels(config.conv_channels)
            .with_hidden_size(config.conv_hidden_size)
    };

    let policy = base(NUM_ACTIONS)
        .with_output_gain(POLICY_GAIN)
        .with_seed(config.seed)
        .init(device);

    let value = config.algorithm.uses_value_network().then(|| {
        base(1)
            .with_output_gain(VALUE_GAIN)
            .with_seed(config.seed.wrapping_add(VALUE_SEED_OFFSET))
            .init(device)
    });

    Networks::new(policy, value)
}
