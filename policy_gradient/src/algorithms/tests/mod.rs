//! Behavioural tests for the estimators and the masked policy.
//!
//! - `returns_tests`: discounted returns, baselines and TD targets
//! - `estimator_tests`: per-algorithm estimates over trajectory batches
//! - `masked_policy_tests`: validity of the masked action distribution

pub mod estimator_tests;
pub mod masked_policy_tests;
