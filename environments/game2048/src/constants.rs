//! Board geometry and encoding constants.

/// Side length of the square board.
pub const BOARD_SIZE: usize = 4;

/// Number of cells on the board.
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Number of discrete actions (Up, Right, Down, Left).
pub const NUM_ACTIONS: usize = 4;

/// Largest tile exponent representable in the observation (tile 2^30).
pub const MAX_EXPONENT: u8 = 30;

/// One-hot channels per cell: exponent 0 (empty) through `MAX_EXPONENT`.
pub const NUM_CHANNELS: usize = MAX_EXPONENT as usize + 1;

/// Flattened observation length: `[4, 4, 31]`.
pub const OBSERVATION_SIZE: usize = NUM_CELLS * NUM_CHANNELS;

/// Probability that a spawned tile is a 2 rather than a 4.
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// Tiles placed on the board by `reset`.
pub const INITIAL_TILES: usize = 2;
