//! Environment abstraction for batched policy-gradient training.
//!
//! The collector drives `n_envs` independent games in lock-step. Finished
//! games are frozen through an [`ActiveMask`] instead of being auto-reset, so
//! every game in a batch contributes exactly one episode.

use game2048_env::{Direction, Game2048, NUM_ACTIONS, OBSERVATION_SIZE};

/// Result from stepping vectorized environments.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Rewards received [n_envs]. Zero for inactive environments.
    pub rewards: Vec<f32>,
    /// Terminal flags (no legal move remains) [n_envs]
    pub terminals: Vec<bool>,
}

impl StepResult {
    /// Create a new step result.
    pub fn new(rewards: Vec<f32>, terminals: Vec<bool>) -> Self {
        debug_assert_eq!(rewards.len(), terminals.len());
        Self { rewards, terminals }
    }

    /// Number of environments that reported a terminal state.
    pub fn terminal_count(&self) -> usize {
        self.terminals.iter().filter(|&&t| t).count()
    }
}

/// Mask of environments still playing their episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMask {
    mask: Vec<bool>,
}

impl ActiveMask {
    /// All environments active.
    pub fn all(n_envs: usize) -> Self {
        Self {
            mask: vec![true; n_envs],
        }
    }

    pub fn from_slice(mask: &[bool]) -> Self {
        Self {
            mask: mask.to_vec(),
        }
    }

    /// Stop advancing environment `env`.
    pub fn deactivate(&mut self, env: usize) {
        self.mask[env] = false;
    }

    #[inline]
    pub fn is_active(&self, env: usize) -> bool {
        self.mask[env]
    }

    /// Check if any environment is still running.
    pub fn any(&self) -> bool {
        self.mask.iter().any(|&x| x)
    }

    /// Number of active environments.
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&x| x).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.mask
    }
}

/// Trait for vectorized discrete environments with legal-action masks.
///
/// Implementations advance only the environments marked active and never
/// auto-reset. `reset_all` starts a fresh episode in every environment.
pub trait VectorizedEnv: Send {
    /// Number of parallel environments.
    fn n_envs(&self) -> usize;

    /// Size of observation vector for single environment.
    fn obs_size(&self) -> usize;

    /// Number of discrete actions.
    fn n_actions(&self) -> usize;

    /// Write current observations to buffer.
    ///
    /// Buffer must have size `n_envs * obs_size`.
    /// Observations are written in flat layout: [env0_obs, env1_obs, ...].
    fn write_observations(&self, buffer: &mut [f32]);

    /// Write legal-action masks (1.0 legal, 0.0 illegal).
    ///
    /// Buffer must have size `n_envs * n_actions`.
    fn write_action_masks(&self, buffer: &mut [f32]);

    /// Step the active environments with the given action indices.
    ///
    /// Inactive environments are left untouched and report reward 0.
    fn step(&mut self, actions: &[u32], active: &ActiveMask) -> StepResult;

    /// Reset all environments. Environment `i` is seeded with `seed + i`.
    fn reset_all(&mut self, seed: u64);

    /// Largest tile reached by environment `env`, for boards that have tiles.
    fn max_tile(&self, _env: usize) -> Option<u32> {
        None
    }

    /// Get current observations as a new vector.
    fn get_observations(&self) -> Vec<f32> {
        let mut buffer = vec![0.0f32; self.n_envs() * self.obs_size()];
        self.write_observations(&mut buffer);
        buffer
    }

    /// Get current legal-action masks as a new vector.
    fn get_action_masks(&self) -> Vec<f32> {
        let mut buffer = vec![0.0f32; self.n_envs() * self.n_actions()];
        self.write_action_masks(&mut buffer);
        buffer
    }
}

// ============================================================================
// 2048 Adapter
// ============================================================================

/// A batch of independent 2048 games.
pub struct Game2048Env {
    games: Vec<Game2048>,
}

impl Game2048Env {
    /// Create `n_envs` games, seeded `seed + i`.
    pub fn new(n_envs: usize, seed: u64) -> Self {
        let games = (0..n_envs as u64)
            .map(|i| Game2048::new(seed.wrapping_add(i)))
            .collect();
        Self { games }
    }

    /// Get a reference to the underlying games.
    pub fn games(&self) -> &[Game2048] {
        &self.games
    }
}

impl VectorizedEnv for Game2048Env {
    fn n_envs(&self) -> usize {
        self.games.len()
    }

    fn obs_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    fn n_actions(&self) -> usize {
        NUM_ACTIONS
    }

    fn write_observations(&self, buffer: &mut [f32]) {
        for (game, chunk) in self.games.iter().zip(buffer.chunks_exact_mut(OBSERVATION_SIZE)) {
            game.write_observation(chunk);
        }
    }

    fn write_action_masks(&self, buffer: &mut [f32]) {
        for (game, chunk) in self.games.iter().zip(buffer.chunks_exact_mut(NUM_ACTIONS)) {
            game.write_action_mask(chunk);
        }
    }

    fn step(&mut self, actions: &[u32], active: &ActiveMask) -> StepResult {
        debug_assert_eq!(actions.len(), self.games.len());

        let mut rewards = vec![0.0f32; self.games.len()];
        let mut terminals = vec![false; self.games.len()];

        for (i, game) in self.games.iter_mut().enumerate() {
            if !active.is_active(i) {
                terminals[i] = game.is_terminal();
                continue;
            }
            match Direction::from_index(actions[i] as usize) {
                Some(direction) => {
                    let outcome = game.step(direction);
                    rewards[i] = outcome.reward;
                    terminals[i] = outcome.terminal;
                }
                None => {
                    log::warn!("env {}: action index {} out of range, ignored", i, actions[i]);
                    terminals[i] = game.is_terminal();
                }
            }
        }

        StepResult::new(rewards, terminals)
    }

    fn reset_all(&mut self, seed: u64) {
        for (i, game) in self.games.iter_mut().enumerate() {
            game.reset(seed.wrapping_add(i as u64));
        }
    }

    fn max_tile(&self, env: usize) -> Option<u32> {
        self.games.get(env).map(Game2048::max_tile)
    }
}
