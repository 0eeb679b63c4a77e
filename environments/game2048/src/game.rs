//! A single seedable 2048 game.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Direction};
use crate::constants::{INITIAL_TILES, NUM_ACTIONS, SPAWN_TWO_PROBABILITY};
use crate::observation::write_one_hot;

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Sum of the values of tiles created by merges.
    pub reward: f32,
    /// Whether the board changed (false for illegal moves).
    pub moved: bool,
    /// No legal move remains after this step.
    pub terminal: bool,
}

/// 2048 game state with its own random generator.
///
/// Two games created with the same seed and fed the same actions produce
/// identical trajectories.
#[derive(Debug, Clone)]
pub struct Game2048 {
    board: Board,
    score: u64,
    moves: u32,
    rng: StdRng,
}

impl Game2048 {
    /// Creates a game with two random tiles.
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            board: Board::empty(),
            score: 0,
            moves: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        game.reset(seed);
        game
    }

    /// Creates a game starting from a fixed board. No tiles are spawned.
    pub fn from_board(board: Board, seed: u64) -> Self {
        Self {
            board,
            score: 0,
            moves: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Clears the board, reseeds and spawns the initial tiles.
    pub fn reset(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.board = Board::empty();
        self.score = 0;
        self.moves = 0;
        for _ in 0..INITIAL_TILES {
            self.spawn_tile();
        }
    }

    /// Places a 2 (p = 0.9) or a 4 in a uniformly chosen empty cell.
    ///
    /// Returns false if the board is full.
    pub fn spawn_tile(&mut self) -> bool {
        let empty = self.board.empty_cells();
        if empty.is_empty() {
            return false;
        }
        let cell = empty[self.rng.gen_range(0..empty.len())];
        let exponent = if self.rng.gen_bool(SPAWN_TWO_PROBABILITY) { 1 } else { 2 };
        self.board.place(cell, exponent);
        true
    }

    /// Applies `direction`.
    ///
    /// An illegal move leaves the board untouched, yields zero reward and
    /// spawns nothing.
    pub fn step(&mut self, direction: Direction) -> MoveOutcome {
        let (next, reward) = self.board.slide(direction);
        let moved = next != self.board;

        if moved {
            self.board = next;
            self.score += u64::from(reward);
            self.moves += 1;
            self.spawn_tile();
        }

        MoveOutcome {
            reward: if moved { reward as f32 } else { 0.0 },
            moved,
            terminal: self.is_terminal(),
        }
    }

    /// Legal-action mask in action-index order.
    #[inline]
    pub fn legal_moves(&self) -> [bool; NUM_ACTIONS] {
        self.board.legal_moves()
    }

    /// Writes the legal-action mask as 1.0 / 0.0 values.
    pub fn write_action_mask(&self, out: &mut [f32]) {
        debug_assert_eq!(out.len(), NUM_ACTIONS);
        for (slot, legal) in out.iter_mut().zip(self.legal_moves()) {
            *slot = if legal { 1.0 } else { 0.0 };
        }
    }

    /// True when no legal move remains.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.board.is_stuck()
    }

    /// Writes the `[4, 4, 31]` one-hot observation.
    #[inline]
    pub fn write_observation(&self, out: &mut [f32]) {
        write_one_hot(&self.board, out);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of board-changing moves since reset.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_spawns_two_small_tiles() {
        for seed in 0..50 {
            let game = Game2048::new(seed);
            assert_eq!(game.board().count_empty(), 14);
            assert!(game.max_tile() <= 4);
            assert_eq!(game.score(), 0);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = Game2048::new(7);
        let mut b = Game2048::new(7);
        for i in 0..40 {
            let d = Direction::ALL[i % 4];
            assert_eq!(a.step(d), b.step(d));
            assert_eq!(a.board(), b.board());
        }
    }

    #[test]
    fn test_illegal_move_is_noop() {
        let mut values = [0u32; 16];
        values[0] = 2;
        let board = Board::from_values(values).unwrap();
        let mut game = Game2048::from_board(board, 0);

        assert!(!game.legal_moves()[Direction::Left.index()]);
        assert!(!game.legal_moves()[Direction::Up.index()]);

        let outcome = game.step(Direction::Left);
        assert!(!outcome.moved);
        assert_eq!(outcome.reward, 0.0);
        assert_eq!(*game.board(), board);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn test_legal_move_spawns_and_rewards() {
        let mut values = [0u32; 16];
        values[0] = 4;
        values[1] = 4;
        let board = Board::from_values(values).unwrap();
        let mut game = Game2048::from_board(board, 3);

        let outcome = game.step(Direction::Left);
        assert!(outcome.moved);
        assert_eq!(outcome.reward, 8.0);
        assert_eq!(game.score(), 8);
        assert_eq!(game.board().tile_value(0, 0), 8);
        // merged tile plus one spawn
        assert_eq!(game.board().count_empty(), 14);
    }

    #[test]
    fn test_terminal_when_stuck() {
        let board = Board::from_values([
            2, 4, 2, 4, //
            4, 2, 4, 2, //
            2, 4, 2, 4, //
            4, 2, 4, 2,
        ])
        .unwrap();
        let game = Game2048::from_board(board, 0);
        assert!(game.is_terminal());

        let mut mask = [1.0f32; 4];
        game.write_action_mask(&mut mask);
        assert_eq!(mask, [0.0; 4]);
    }

    #[test]
    fn test_random_play_reaches_terminal() {
        let mut game = Game2048::new(11);
        let mut rng = StdRng::seed_from_u64(5);
        let mut steps = 0;
        while !game.is_terminal() {
            let legal: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| game.legal_moves()[d.index()])
                .collect();
            let d = legal[rng.gen_range(0..legal.len())];
            assert!(game.step(d).moved);
            steps += 1;
            assert!(steps < 100_000);
        }
        assert_eq!(game.legal_moves(), [false; 4]);
    }
}
