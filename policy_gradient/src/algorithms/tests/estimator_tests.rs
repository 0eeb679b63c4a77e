//! Tests for per-algorithm estimates computed from trajectory batches.

use crate::algorithms::algorithm::AlgorithmKind;
use crate::core::{EpisodeEnd, Trajectory, TrajectoryBatch};
use crate::runners::config::ConfigError;

/// One-dimensional observations holding the step index.
fn trajectory(rewards: &[f32], end: EpisodeEnd) -> Trajectory {
    let mut t = Trajectory::new(&[0.0], 4);
    for (i, &r) in rewards.iter().enumerate() {
        t.push(&[1.0; 4], 0, r, &[(i + 1) as f32]);
    }
    t.finish(end);
    t
}

fn batch(episodes: Vec<Trajectory>) -> TrajectoryBatch {
    TrajectoryBatch::new(episodes, 1, 4)
}

#[test]
fn test_reinforce_weights_are_discounted_returns() {
    let b = batch(vec![trajectory(&[2.0, 4.0, 0.0, 8.0], EpisodeEnd::Terminal)]);
    let est = AlgorithmKind::Reinforce.estimate(&b, &[], &[], 0.5, false);

    assert_eq!(est.advantages, vec![5.0, 6.0, 4.0, 8.0]);
    assert!(est.value_targets.is_none());
    assert_eq!(est.returns, Some(vec![5.0, 6.0, 4.0, 8.0]));
}

#[test]
fn test_reinforce_restarts_returns_per_episode() {
    let b = batch(vec![
        trajectory(&[1.0, 1.0], EpisodeEnd::Terminal),
        trajectory(&[4.0], EpisodeEnd::Truncated),
    ]);
    let est = AlgorithmKind::Reinforce.estimate(&b, &[], &[], 0.5, false);
    assert_eq!(est.advantages, vec![1.5, 1.0, 4.0]);
}

#[test]
fn test_baseline_targets_are_returns() {
    let b = batch(vec![trajectory(&[2.0, 4.0, 0.0, 8.0], EpisodeEnd::Terminal)]);
    let values = [1.0, 1.0, 1.0, 1.0];
    let est = AlgorithmKind::ReinforceBaseline.estimate(&b, &values, &[], 0.5, false);

    assert_eq!(est.value_targets, Some(vec![5.0, 6.0, 4.0, 8.0]));
    assert_eq!(est.advantages, vec![4.0, 5.0, 3.0, 7.0]);
}

#[test]
fn test_actor_critic_terminal_step_does_not_bootstrap() {
    let b = batch(vec![trajectory(&[1.0, 2.0], EpisodeEnd::Terminal)]);
    let values = [0.0, 0.0];
    let next_values = [3.0, 100.0];
    let est = AlgorithmKind::ActorCritic.estimate(&b, &values, &next_values, 0.5, false);

    let targets = est.value_targets.unwrap();
    assert!((targets[0] - 2.5).abs() < 1e-6);
    assert_eq!(targets[1], 2.0);
}

#[test]
fn test_actor_critic_truncated_step_bootstraps() {
    let b = batch(vec![trajectory(&[1.0, 2.0], EpisodeEnd::Truncated)]);
    let est = AlgorithmKind::ActorCritic.estimate(&b, &[0.0, 0.0], &[0.0, 4.0], 0.5, false);

    let targets = est.value_targets.unwrap();
    assert!((targets[1] - 4.0).abs() < 1e-6);
}

#[test]
fn test_zero_reward_batch_has_zero_weights_for_every_algorithm() {
    let b = batch(vec![
        trajectory(&[0.0; 5], EpisodeEnd::Terminal),
        trajectory(&[0.0; 3], EpisodeEnd::Truncated),
    ]);
    let zeros = vec![0.0f32; b.len()];

    for kind in AlgorithmKind::ALL {
        let est = kind.estimate(&b, &zeros, &zeros, 0.99, false);
        assert_eq!(est.advantages.len(), b.len());
        assert!(est.advantages.iter().all(|&a| a == 0.0), "{}", kind);
    }
}

#[test]
fn test_random_never_normalizes() {
    let b = batch(vec![trajectory(&[1.0, 2.0, 3.0], EpisodeEnd::Terminal)]);
    let est = AlgorithmKind::Random.estimate(&b, &[], &[], 0.9, true);
    assert_eq!(est.advantages, vec![0.0; 3]);
}

#[test]
fn test_normalized_weights_are_centered() {
    let b = batch(vec![trajectory(&[1.0, 5.0, 2.0, 0.0], EpisodeEnd::Terminal)]);
    let est = AlgorithmKind::Reinforce.estimate(&b, &[], &[], 0.9, true);
    let mean = est.advantages.iter().sum::<f32>() / est.advantages.len() as f32;
    assert!(mean.abs() < 1e-5);
}

#[test]
#[should_panic(expected = "value estimates must cover the batch")]
fn test_baseline_requires_values() {
    let b = batch(vec![trajectory(&[1.0], EpisodeEnd::Terminal)]);
    AlgorithmKind::ReinforceBaseline.estimate(&b, &[], &[], 0.9, false);
}

#[test]
fn test_algorithm_kind_parsing() {
    assert_eq!("reinforce".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Reinforce);
    assert_eq!("REINFORCE_BASELINE".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::ReinforceBaseline);
    assert_eq!("baseline".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::ReinforceBaseline);
    assert_eq!("actor-critic".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::ActorCritic);
    assert_eq!("ac".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::ActorCritic);
    assert_eq!("random".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Random);

    match "ppo".parse::<AlgorithmKind>() {
        Err(ConfigError::UnknownAlgorithm(name)) => assert_eq!(name, "ppo"),
        other => panic!("expected unknown algorithm error, got {:?}", other),
    }
}

#[test]
fn test_algorithm_kind_display_roundtrips() {
    for kind in AlgorithmKind::ALL {
        assert_eq!(kind.to_string().parse::<AlgorithmKind>().unwrap(), kind);
    }
}

#[test]
fn test_algorithm_capabilities() {
    assert!(!AlgorithmKind::Random.trains_policy());
    assert!(!AlgorithmKind::Reinforce.uses_value_network());
    assert!(AlgorithmKind::ReinforceBaseline.uses_value_network());
    assert!(!AlgorithmKind::ReinforceBaseline.bootstraps());
    assert!(AlgorithmKind::ActorCritic.bootstraps());
}
