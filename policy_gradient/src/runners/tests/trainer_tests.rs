//! Trainer state machine, error paths and 2048 smoke runs.

use burn::backend::{Autodiff, NdArray};

use super::toy_env::{RewardedActionEnv, TOY_ACTIONS, TOY_OBS_SIZE};
use crate::algorithms::AlgorithmKind;
use crate::environment::Game2048Env;
use crate::error::{NetworkKind, TrainingError};
use crate::nn::{Architecture, Mlp, MlpConfig};
use crate::runners::{
    build_conv_networks, build_mlp_networks, ConfigError, Networks, Trainer, TrainingConfig,
    TrainingState,
};

type B = Autodiff<NdArray<f32>>;

fn toy_networks(with_value: bool) -> Networks<Mlp<B>, Mlp<B>> {
    let device = Default::default();
    let policy = MlpConfig::new(TOY_OBS_SIZE, TOY_ACTIONS)
        .with_hidden_sizes(vec![8])
        .init(&device);
    let value = with_value.then(|| MlpConfig::new(TOY_OBS_SIZE, 1).with_hidden_sizes(vec![8]).init(&device));
    Networks::new(policy, value)
}

fn small_2048_config(algorithm: AlgorithmKind) -> TrainingConfig {
    TrainingConfig::new()
        .with_algorithm(algorithm)
        .with_batch_size(2)
        .with_iterations(2)
        .with_max_episode_steps(30)
        .with_hidden_sizes(vec![32])
        .with_seed(3)
}

/// Test the RUNNING -> DONE state machine.
/// INTENT: Exactly `iterations` steps run, then the trainer stays Done.
#[test]
fn test_trainer_runs_configured_iterations() {
    let config = TrainingConfig::new().with_batch_size(4).with_iterations(3);
    let mut trainer =
        Trainer::new(config, RewardedActionEnv::new(4), toy_networks(false), Default::default()).unwrap();

    assert_eq!(trainer.state(), TrainingState::Running { iteration: 0 });
    for expected in 0..3 {
        let stats = trainer.step().unwrap().expect("trainer should still be running");
        assert_eq!(stats.iteration, expected);
        assert_eq!(stats.episodes.episodes, 4);
        assert_eq!(stats.env_steps, 4);
    }
    assert_eq!(trainer.state(), TrainingState::Done);
    assert!(trainer.step().unwrap().is_none());

    let report = trainer.report();
    assert_eq!(report.history.len(), 3);
    assert_eq!(report.total_episodes, 12);
    assert_eq!(report.total_env_steps, 12);
}

/// Test that a NaN reward aborts with a non-finite policy loss.
/// INTENT: Numerical instability is fatal, never silently skipped.
#[test]
fn test_nan_reward_aborts_training() {
    let config = TrainingConfig::new().with_batch_size(8).with_iterations(5);
    let env = RewardedActionEnv::with_rewards(8, f32::NAN, f32::NAN);
    let mut trainer = Trainer::new(config, env, toy_networks(false), Default::default()).unwrap();

    let err = trainer.run().unwrap_err();
    match err {
        TrainingError::NonFiniteLoss {
            iteration,
            network,
            value,
        } => {
            assert_eq!(iteration, 0);
            assert_eq!(network, NetworkKind::Policy);
            assert!(!value.is_finite());
        }
        other => panic!("expected NonFiniteLoss, got {other:?}"),
    }
}

/// Test that infinite rewards abort before the value network is stepped.
/// INTENT: The policy update runs first and fails fast.
#[test]
fn test_infinite_rewards_abort_with_baseline() {
    let config = TrainingConfig::new()
        .with_batch_size(4)
        .with_algorithm(AlgorithmKind::ReinforceBaseline);
    let env = RewardedActionEnv::with_rewards(4, f32::INFINITY, f32::INFINITY);
    let mut trainer = Trainer::new(config, env, toy_networks(true), Default::default()).unwrap();

    let err = trainer.step().unwrap_err();
    assert!(matches!(
        err,
        TrainingError::NonFiniteLoss {
            network: NetworkKind::Policy,
            ..
        }
    ));
}

/// Test that invalid configurations are rejected before any iteration.
/// INTENT: Configuration errors surface at startup.
#[test]
fn test_invalid_config_rejected_at_construction() {
    let config = TrainingConfig::new().with_batch_size(4).with_gamma(1.0);
    let result = Trainer::new(config, RewardedActionEnv::new(4), toy_networks(false), Default::default());
    assert!(matches!(
        result,
        Err(TrainingError::Config(ConfigError::OutOfRange { field: "gamma", .. }))
    ));
}

/// Test that the environment count must equal the batch size.
#[test]
fn test_batch_size_mismatch_rejected() {
    let config = TrainingConfig::new().with_batch_size(4);
    let result = Trainer::new(config, RewardedActionEnv::new(3), toy_networks(false), Default::default());
    assert!(matches!(
        result,
        Err(TrainingError::Config(ConfigError::BatchSizeMismatch {
            batch_size: 4,
            n_envs: 3
        }))
    ));
}

/// Test that value-based algorithms require a value network.
#[test]
fn test_missing_value_network_rejected() {
    let config = TrainingConfig::new()
        .with_batch_size(2)
        .with_algorithm(AlgorithmKind::ActorCritic);
    let result = Trainer::new(config, RewardedActionEnv::new(2), toy_networks(false), Default::default());
    assert!(matches!(
        result,
        Err(TrainingError::Config(ConfigError::MissingValueNetwork("actor-critic")))
    ));
}

/// Test that a 2048-sized network is rejected on the toy environment.
#[test]
fn test_network_shape_mismatch_rejected() {
    let config = TrainingConfig::new().with_batch_size(2).with_hidden_sizes(vec![8]);
    let networks = build_mlp_networks::<B>(&config, &Default::default());
    let result = Trainer::new(config, RewardedActionEnv::new(2), networks, Default::default());
    assert!(matches!(
        result,
        Err(TrainingError::ShapeMismatch {
            what: "observation size",
            env: 2,
            model: 496
        })
    ));
}

/// Test every algorithm end to end on 2048 with a small MLP.
/// INTENT: Each variant updates exactly the networks it owns.
#[test]
fn test_all_algorithms_train_on_2048() {
    for algorithm in AlgorithmKind::ALL {
        let config = small_2048_config(algorithm);
        let device = Default::default();
        let networks = build_mlp_networks::<B>(&config, &device);
        assert_eq!(networks.value.is_some(), algorithm.uses_value_network());

        let env = Game2048Env::new(config.batch_size, config.seed);
        let mut trainer = Trainer::new(config, env, networks, device).unwrap();
        let report = trainer.run().unwrap();

        assert_eq!(report.history.len(), 2, "{}", algorithm);
        for stats in &report.history {
            assert_eq!(stats.episodes.episodes, 2);
            assert!(stats.env_steps > 0 && stats.env_steps <= 60);
            assert!(stats.episodes.max_tile >= 2);
            assert_eq!(stats.update.policy_loss.is_some(), algorithm.trains_policy());
            assert_eq!(stats.update.value_loss.is_some(), algorithm.uses_value_network());
        }
    }
}

/// Test the convolutional architecture end to end.
#[test]
fn test_conv_actor_critic_trains_on_2048() {
    let config = small_2048_config(AlgorithmKind::ActorCritic)
        .with_architecture(Architecture::Conv)
        .with_conv_channels([4, 8])
        .with_conv_hidden_size(16);
    let device = Default::default();
    let networks = build_conv_networks::<B>(&config, &device);

    let env = Game2048Env::new(config.batch_size, config.seed);
    let mut trainer = Trainer::new(config, env, networks, device).unwrap();
    let report = trainer.run().unwrap();

    assert_eq!(report.history.len(), 2);
    assert!(report.history.iter().all(|s| s.update.value_loss.is_some()));
}

/// Test that two runs with the same seed are identical.
/// INTENT: Environments, sampling and initialization are all seeded.
#[test]
fn test_same_seed_reproduces_run() {
    let run = || {
        let config = small_2048_config(AlgorithmKind::ReinforceBaseline);
        let device = Default::default();
        let networks = build_mlp_networks::<B>(&config, &device);
        let env = Game2048Env::new(config.batch_size, config.seed);
        Trainer::new(config, env, networks, device)
            .unwrap()
            .run()
            .unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.history, b.history);
}
