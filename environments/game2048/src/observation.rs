//! One-hot observation encoding.
//!
//! Layout is `[row, col, channel]` flattened row-major, where channel `k`
//! is hot when the cell holds exponent `k` (channel 0 marks an empty cell).

use crate::board::Board;
use crate::constants::{NUM_CELLS, NUM_CHANNELS, OBSERVATION_SIZE};

/// Writes the one-hot encoding of `board` into `out`.
///
/// # Panics
///
/// Panics if `out.len() != OBSERVATION_SIZE`.
pub fn write_one_hot(board: &Board, out: &mut [f32]) {
    assert_eq!(
        out.len(),
        OBSERVATION_SIZE,
        "observation buffer must hold {} values",
        OBSERVATION_SIZE
    );
    out.fill(0.0);
    for (cell, &exponent) in board.exponents().iter().enumerate() {
        out[cell * NUM_CHANNELS + exponent as usize] = 1.0;
    }
}

/// Recovers the board from a one-hot observation.
///
/// Returns `None` if any cell is not exactly one-hot.
pub fn decode_one_hot(obs: &[f32]) -> Option<Board> {
    if obs.len() != OBSERVATION_SIZE {
        return None;
    }
    let mut cells = [0u8; NUM_CELLS];
    for (cell, chunk) in obs.chunks_exact(NUM_CHANNELS).enumerate() {
        let mut hot = chunk.iter().enumerate().filter(|(_, &v)| v == 1.0);
        let (exponent, _) = hot.next()?;
        if hot.next().is_some() || chunk.iter().any(|&v| v != 0.0 && v != 1.0) {
            return None;
        }
        cells[cell] = exponent as u8;
    }
    Some(Board::from_exponents(cells))
}
