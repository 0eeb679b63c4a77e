//! Runner test suite.
//!
//! - `toy_env`: deterministic single-step environment with a known best action
//! - `trainer_tests`: state machine, error paths and all-algorithm smoke runs
//! - `batch_size_tests`: batch size 1 vs 200 on the toy environment

mod toy_env;
mod trainer_tests;
