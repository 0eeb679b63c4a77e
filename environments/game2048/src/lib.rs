//! 2048 simulator for policy-gradient training.
//!
//! A deterministic, seedable implementation of the 2048 sliding-tile game
//! exposing what a learning agent needs: the legal-action mask, merge rewards,
//! terminal detection and a `[4, 4, 31]` one-hot observation.
//!
//! # Example
//!
//! ```rust
//! use game2048_env::{Direction, Game2048, OBSERVATION_SIZE};
//!
//! let mut game = Game2048::new(42);
//! let mut obs = vec![0.0f32; OBSERVATION_SIZE];
//!
//! while !game.is_terminal() {
//!     let legal = game.legal_moves();
//!     let dir = Direction::ALL
//!         .into_iter()
//!         .find(|d| legal[d.index()])
//!         .unwrap();
//!     game.step(dir);
//!     game.write_observation(&mut obs);
//! }
//! println!("score {} max tile {}", game.score(), game.max_tile());
//! ```
//!
//! # Actions
//!
//! Action indices follow [`Direction`]: `0 = Up`, `1 = Right`, `2 = Down`,
//! `3 = Left`.

pub mod board;
pub mod constants;
pub mod game;
pub mod observation;

pub use board::{Board, Direction};
pub use constants::{BOARD_SIZE, MAX_EXPONENT, NUM_ACTIONS, NUM_CELLS, NUM_CHANNELS, OBSERVATION_SIZE};
pub use game::{Game2048, MoveOutcome};
pub use observation::{decode_one_hot, write_one_hot};
