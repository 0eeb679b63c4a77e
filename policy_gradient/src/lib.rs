//! # Policy Gradient: REINFORCE-family training for 2048
//!
//! Monte Carlo and one-step policy-gradient methods over a batch of
//! independent 2048 games, built on Burn.
//!
//! ## Training Loop
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          Trainer                               │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │  VectorizedEnv ──► TrajectoryCollector ──► TrajectoryBatch     │
//! │   (N games,          (lock-step,             (N episodes)      │
//! │    done-mask)         masked sampling)            │            │
//! │                                                   ▼            │
//! │                                   AlgorithmKind::estimate      │
//! │                                   (returns / baseline / TD)    │
//! │                                                   │            │
//! │                                                   ▼            │
//! │  Networks { policy, value } ◄────────── NetworkUpdate          │
//! │                                   (one Adam step per network)  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithms
//!
//! | Variant | Policy weight | Value target |
//! |---|---|---|
//! | `Reinforce` | `G_t` | - |
//! | `ReinforceBaseline` | `G_t - V(s_t)` | `G_t` |
//! | `ActorCritic` | `r_t + γV(s_{t+1}) - V(s_t)` | `r_t + γV(s_{t+1})` |
//! | `Random` | uniform legal moves, no update | - |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::{Autodiff, NdArray};
//! use policy_gradient::{build_mlp_networks, AlgorithmKind, Game2048Env, Trainer, TrainingConfig};
//!
//! type B = Autodiff<NdArray>;
//!
//! let config = TrainingConfig::new()
//!     .with_algorithm(AlgorithmKind::ActorCritic)
//!     .with_batch_size(32);
//! let device = Default::default();
//! let networks = build_mlp_networks::<B>(&config, &device);
//! let env = Game2048Env::new(config.batch_size, config.seed);
//!
//! let report = Trainer::new(config, env, networks, device)?.run()?;
//! println!("best tile {}", report.best_tile());
//! ```

pub mod algorithms;
pub mod core;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod nn;
pub mod runners;
pub mod scheduling;

// Re-export commonly used types
pub use algorithms::{AlgorithmKind, Estimates, MaskedPolicyOutput};
pub use core::{EpisodeEnd, Trajectory, TrajectoryBatch, Transition};
pub use environment::{ActiveMask, Game2048Env, StepResult, VectorizedEnv};
pub use error::{NetworkKind, Result, TrainingError};
pub use metrics::{
    CSVLogger, ConsoleLogger, EpisodeStats, MetricsLogger, MultiLogger, TrainingSnapshot,
};
pub use nn::{
    Architecture, BoardConvNet, BoardConvNetConfig, Mlp, MlpConfig, PolicyNetwork, ValueNetwork,
};
pub use runners::{
    build_conv_networks, build_mlp_networks, ConfigError, IterationStats, Networks, Trainer,
    TrainingConfig, TrainingReport, TrainingState, TrajectoryCollector,
};
pub use scheduling::{ConstantLR, ExponentialDecay, LRScheduler};
