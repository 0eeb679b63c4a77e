//! Core data types shared by the collector, estimators and losses.

pub mod transition;

pub use transition::{EpisodeEnd, Trajectory, TrajectoryBatch, Transition};
