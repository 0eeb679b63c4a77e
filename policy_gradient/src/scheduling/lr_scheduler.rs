//! Learning rate schedulers.
//!
//! - `ConstantLR`: Fixed learning rate
//! - `ExponentialDecay`: Halve the learning rate every `halving_steps`
//!   optimizer steps, never going below `min(lr, 1e-5)`
//!
//! Schedulers are pure functions of the optimizer step count; the trainer
//! owns the counter.
//!
//! # Data Integrity
//!
//! Non-finite or negative learning rates trigger a debug panic and are
//! replaced with 0.0 in release builds.

/// Lower bound of decayed learning rates.
pub const MIN_DECAYED_LR: f64 = 1e-5;

/// Learning rate scheduler trait.
pub trait LRScheduler: Send + Sync {
    /// Get the learning rate for a given optimizer step.
    fn get_lr(&self, step: usize) -> f64;
}

/// Build the scheduler for a base learning rate and optional halving period.
pub fn scheduler_for(lr: f64, halving_steps: Option<usize>) -> Box<dyn LRScheduler> {
    match halving_steps {
        Some(steps) => Box::new(ExponentialDecay::new(lr, steps)),
        None => Box::new(ConstantLR::new(lr)),
    }
}

fn sanitize(lr: f64, who: &str) -> f64 {
    debug_assert!(lr.is_finite(), "{}: lr must be finite, got {}", who, lr);
    debug_assert!(lr >= 0.0, "{}: lr must be non-negative, got {}", who, lr);
    if lr.is_finite() && lr >= 0.0 {
        lr
    } else {
        0.0
    }
}

/// Constant learning rate (no scheduling).
#[derive(Debug, Clone)]
pub struct ConstantLR {
    lr: f64,
}

impl ConstantLR {
    /// Create a new constant LR scheduler.
    ///
    /// # Panics (debug only)
    ///
    /// Panics if `lr` is NaN, Inf, or negative.
    pub fn new(lr: f64) -> Self {
        Self {
            lr: sanitize(lr, "ConstantLR"),
        }
    }

    /// Get the configured learning rate.
    pub fn lr(&self) -> f64 {
        self.lr
    }
}

impl LRScheduler for ConstantLR {
    fn get_lr(&self, _step: usize) -> f64 {
        self.lr
    }
}

/// Continuous exponential decay with a floor.
///
/// lr(step) = max(base_lr * 0.5^(step / halving_steps), min(base_lr, 1e-5))
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    base_lr: f64,
    halving_steps: usize,
    floor: f64,
}

impl ExponentialDecay {
    /// Create a new decay scheduler.
    ///
    /// # Panics (debug only)
    ///
    /// Panics if `halving_steps` is 0 or `base_lr` is invalid. In release
    /// builds `halving_steps = 0` behaves as a constant rate.
    pub fn new(base_lr: f64, halving_steps: usize) -> Self {
        debug_assert!(
            halving_steps > 0,
            "ExponentialDecay: halving_steps must be > 0, got {}",
            halving_steps
        );
        let base_lr = sanitize(base_lr, "ExponentialDecay");
        Self {
            base_lr,
            halving_steps,
            floor: base_lr.min(MIN_DECAYED_LR),
        }
    }

    pub fn base_lr(&self) -> f64 {
        self.base_lr
    }

    pub fn halving_steps(&self) -> usize {
        self.halving_steps
    }
}

impl LRScheduler for ExponentialDecay {
    fn get_lr(&self, step: usize) -> f64 {
        if self.halving_steps == 0 {
            return self.base_lr;
        }
        let exponent = step as f64 / self.halving_steps as f64;
        (self.base_lr * 0.5f64.powf(exponent)).max(self.floor)
    }
}
