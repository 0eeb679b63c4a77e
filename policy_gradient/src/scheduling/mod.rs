//! Learning rate scheduling.

pub mod lr_scheduler;

pub use lr_scheduler::{scheduler_for, ConstantLR, ExponentialDecay, LRScheduler, MIN_DECAYED_LR};
