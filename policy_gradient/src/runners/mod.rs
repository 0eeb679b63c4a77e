//! Training runners for the REINFORCE family.
//!
//! - [`TrajectoryCollector`]: lock-step episode collection over a vectorized env
//! - [`NetworkUpdate`]: per-network Adam steps with gradient clipping
//! - [`Trainer`]: the collect → estimate → update → log loop
//! - [`TrainingConfig`]: run configuration and validation

pub mod collector;
pub mod config;
pub mod optimizer;
pub mod trainer;

#[cfg(test)]
mod tests;

pub use collector::{ActionSource, TrajectoryCollector};
pub use config::{ConfigError, TrainingConfig};
pub use optimizer::{NetworkUpdate, Networks, UpdateBatch, UpdateStats};
pub use trainer::{
    build_conv_networks, build_mlp_networks, IterationStats, Trainer, TrainingReport, TrainingState,
};
