//! Board representation and the slide/merge rule.
//!
//! Cells are stored row-major as tile exponents: `0` is an empty cell and
//! `k` is the tile `2^k`. Moves are expressed by walking each row or column
//! starting from the edge the tiles slide toward, so a single line routine
//! handles all four directions.

use crate::constants::{BOARD_SIZE, MAX_EXPONENT, NUM_CELLS};

/// Direction of a move. The discriminant is the action index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All directions in action-index order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Maps an action index to a direction. Returns `None` for indices >= 4.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Action index of this direction.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }

    /// Cell indices of line `i`, ordered from the edge tiles slide toward.
    fn line(self, i: usize) -> [usize; BOARD_SIZE] {
        let mut cells = [0usize; BOARD_SIZE];
        for (k, cell) in cells.iter_mut().enumerate() {
            let far = BOARD_SIZE - 1 - k;
            *cell = match self {
                Direction::Left => i * BOARD_SIZE + k,
                Direction::Right => i * BOARD_SIZE + far,
                Direction::Up => k * BOARD_SIZE + i,
                Direction::Down => far * BOARD_SIZE + i,
            };
        }
        cells
    }
}

/// A 4x4 board of tile exponents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [u8; NUM_CELLS],
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Self {
        Self {
            cells: [0; NUM_CELLS],
        }
    }

    /// Builds a board from row-major exponents.
    ///
    /// # Panics
    ///
    /// Panics if any exponent exceeds `MAX_EXPONENT`.
    pub fn from_exponents(cells: [u8; NUM_CELLS]) -> Self {
        assert!(
            cells.iter().all(|&e| e <= MAX_EXPONENT),
            "tile exponent exceeds {}",
            MAX_EXPONENT
        );
        Self { cells }
    }

    /// Builds a board from row-major tile values (0 or a power of two).
    ///
    /// Returns `None` if a value is not a power of two or is out of range.
    pub fn from_values(values: [u32; NUM_CELLS]) -> Option<Self> {
        let mut cells = [0u8; NUM_CELLS];
        for (cell, &value) in cells.iter_mut().zip(values.iter()) {
            if value == 0 {
                continue;
            }
            // 1 = 2^0 would collide with the empty encoding
            if !value.is_power_of_two() || value == 1 {
                return None;
            }
            let exponent = value.trailing_zeros() as u8;
            if exponent > MAX_EXPONENT {
                return None;
            }
            *cell = exponent;
        }
        Some(Self { cells })
    }

    /// Row-major exponents.
    #[inline]
    pub fn exponents(&self) -> &[u8; NUM_CELLS] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * BOARD_SIZE + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, exponent: u8) {
        debug_assert!(exponent <= MAX_EXPONENT);
        self.cells[row * BOARD_SIZE + col] = exponent;
    }

    /// Tile value at `(row, col)`, or 0 if empty.
    #[inline]
    pub fn tile_value(&self, row: usize, col: usize) -> u32 {
        exponent_value(self.get(row, col))
    }

    /// Largest tile value on the board.
    pub fn max_tile(&self) -> u32 {
        exponent_value(self.cells.iter().copied().max().unwrap_or(0))
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&e| e == 0).count()
    }

    /// Flat indices of empty cells.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &e)| e == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Places `exponent` at a flat cell index.
    #[inline]
    pub(crate) fn place(&mut self, cell: usize, exponent: u8) {
        self.cells[cell] = exponent;
    }

    /// Applies a move without spawning.
    ///
    /// Returns the resulting board and the reward, which is the sum of the
    /// values of all tiles created by merges.
    pub fn slide(&self, direction: Direction) -> (Board, u32) {
        let mut next = *self;
        let mut reward = 0u32;

        for i in 0..BOARD_SIZE {
            let indices = direction.line(i);
            let mut line = [0u8; BOARD_SIZE];
            for (k, &idx) in indices.iter().enumerate() {
                line[k] = self.cells[idx];
            }

            let (merged, line_reward) = slide_line(line);
            reward += line_reward;

            for (k, &idx) in indices.iter().enumerate() {
                next.cells[idx] = merged[k];
            }
        }

        (next, reward)
    }

    /// Whether moving in `direction` changes the board.
    pub fn can_move(&self, direction: Direction) -> bool {
        (0..BOARD_SIZE).any(|i| {
            let indices = direction.line(i);
            let mut seen_gap = false;
            let mut previous = 0u8;
            for &idx in &indices {
                let e = self.cells[idx];
                if e == 0 {
                    seen_gap = true;
                } else if seen_gap || e == previous {
                    return true;
                }
                if e != 0 {
                    previous = e;
                }
            }
            false
        })
    }

    /// Legal-action mask in action-index order.
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|d| self.can_move(d))
    }

    /// True when no move changes the board.
    pub fn is_stuck(&self) -> bool {
        !Direction::ALL.iter().any(|&d| self.can_move(d))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let value = self.tile_value(row, col);
                if value == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{:>6}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[inline]
fn exponent_value(exponent: u8) -> u32 {
    if exponent == 0 {
        0
    } else {
        1u32 << exponent
    }
}

/// Slides one line toward index 0, merging equal neighbours once.
fn slide_line(line: [u8; BOARD_SIZE]) -> ([u8; BOARD_SIZE], u32) {
    let mut out = [0u8; BOARD_SIZE];
    let mut reward = 0u32;
    let mut write = 0usize;
    let mut pending: Option<u8> = None;

    for &e in line.iter().filter(|&&e| e != 0) {
        match pending {
            Some(p) if p == e => {
                let merged = (p + 1).min(MAX_EXPONENT);
                out[write] = merged;
                write += 1;
                reward += exponent_value(merged);
                pending = None;
            }
            Some(p) => {
                out[write] = p;
                write += 1;
                pending = Some(e);
            }
            None => pending = Some(e),
        }
    }
    if let Some(p) = pending {
        out[write] = p;
    }

    (out, reward)
}
