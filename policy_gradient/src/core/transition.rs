//! Transition and trajectory types for on-policy episode collection.
//!
//! - `Trajectory`: one complete (or step-capped) episode from one environment
//! - `Transition`: borrowed view of a single step inside a trajectory
//! - `TrajectoryBatch`: all trajectories of one collection round, with the
//!   flattened accessors used by the estimators and losses
//!
//! A trajectory of `T` steps stores `T + 1` observations so that the state
//! after the last action is available for bootstrapping.

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    /// The environment reported a terminal state (no legal move).
    Terminal,
    /// The collector stopped the episode at the step cap.
    Truncated,
}

/// Borrowed view of one recorded step.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    /// Observation before the action
    pub state: &'a [f32],
    /// Legal-action mask at `state` (1.0 legal, 0.0 illegal)
    pub action_mask: &'a [f32],
    /// Action taken
    pub action: u32,
    /// Reward received
    pub reward: f32,
    /// Observation after the action
    pub next_state: &'a [f32],
    /// Episode terminated at this step (no bootstrap)
    pub terminal: bool,
    /// Episode cut by the step cap at this step
    pub truncated: bool,
}

impl Transition<'_> {
    /// Check if episode ended (terminal or truncated).
    pub fn done(&self) -> bool {
        self.terminal || self.truncated
    }
}

/// One episode recorded from a single environment.
#[derive(Debug, Clone)]
pub struct Trajectory {
    obs_size: usize,
    n_actions: usize,
    observations: Vec<f32>,
    action_masks: Vec<f32>,
    actions: Vec<u32>,
    rewards: Vec<f32>,
    end: Option<EpisodeEnd>,
    max_tile: Option<u32>,
}

impl Trajectory {
    /// Start a trajectory from the reset observation.
    pub fn new(initial_obs: &[f32], n_actions: usize) -> Self {
        Self {
            obs_size: initial_obs.len(),
            n_actions,
            observations: initial_obs.to_vec(),
            action_masks: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            end: None,
            max_tile: None,
        }
    }

    /// Record one step.
    ///
    /// `action_mask` is the mask at the state the action was taken from and
    /// `next_obs` the observation the action led to.
    pub fn push(&mut self, action_mask: &[f32], action: u32, reward: f32, next_obs: &[f32]) {
        debug_assert!(self.end.is_none(), "push after episode end");
        debug_assert_eq!(next_obs.len(), self.obs_size);
        debug_assert_eq!(action_mask.len(), self.n_actions);
        self.action_masks.extend_from_slice(action_mask);
        self.actions.push(action);
        self.rewards.push(reward);
        self.observations.extend_from_slice(next_obs);
    }

    /// Mark the episode as finished.
    pub fn finish(&mut self, end: EpisodeEnd) {
        self.end = Some(end);
    }

    pub fn set_max_tile(&mut self, max_tile: Option<u32>) {
        self.max_tile = max_tile;
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn end(&self) -> Option<EpisodeEnd> {
        self.end
    }

    pub fn is_terminal(&self) -> bool {
        self.end == Some(EpisodeEnd::Terminal)
    }

    pub fn max_tile(&self) -> Option<u32> {
        self.max_tile
    }

    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn actions(&self) -> &[u32] {
        &self.actions
    }

    /// Undiscounted sum of rewards.
    pub fn episode_return(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Observation at step `t` (`t == len()` is the final observation).
    pub fn observation(&self, t: usize) -> &[f32] {
        &self.observations[t * self.obs_size..(t + 1) * self.obs_size]
    }

    /// Observations `s_0 .. s_{T-1}` flattened.
    pub fn states(&self) -> &[f32] {
        &self.observations[..self.len() * self.obs_size]
    }

    /// Observations `s_1 .. s_T` flattened.
    pub fn next_states(&self) -> &[f32] {
        &self.observations[self.obs_size..]
    }

    pub fn action_masks(&self) -> &[f32] {
        &self.action_masks
    }

    /// Per-step terminal flags: only the last step of a terminal episode is set.
    pub fn terminals(&self) -> Vec<bool> {
        let mut flags = vec![false; self.len()];
        if self.is_terminal() {
            if let Some(last) = flags.last_mut() {
                *last = true;
            }
        }
        flags
    }

    /// Borrowed view of step `t`.
    pub fn transition(&self, t: usize) -> Transition<'_> {
        let last = t + 1 == self.len();
        Transition {
            state: self.observation(t),
            action_mask: &self.action_masks[t * self.n_actions..(t + 1) * self.n_actions],
            action: self.actions[t],
            reward: self.rewards[t],
            next_state: self.observation(t + 1),
            terminal: last && self.end == Some(EpisodeEnd::Terminal),
            truncated: last && self.end == Some(EpisodeEnd::Truncated),
        }
    }

    /// Iterate over the recorded transitions in order.
    pub fn transitions(&self) -> impl Iterator<Item = Transition<'_>> {
        (0..self.len()).map(move |t| self.transition(t))
    }
}

/// The trajectories gathered in one collection round.
#[derive(Debug, Clone)]
pub struct TrajectoryBatch {
    trajectories: Vec<Trajectory>,
    obs_size: usize,
    n_actions: usize,
}

impl TrajectoryBatch {
    pub fn new(trajectories: Vec<Trajectory>, obs_size: usize, n_actions: usize) -> Self {
        Self {
            trajectories,
            obs_size,
            n_actions,
        }
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Number of episodes.
    pub fn n_episodes(&self) -> usize {
        self.trajectories.len()
    }

    /// Total number of transitions across all episodes.
    pub fn len(&self) -> usize {
        self.trajectories.iter().map(Trajectory::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// States `[len * obs_size]`, episodes concatenated.
    pub fn observations(&self) -> Vec<f32> {
        self.concat(|t| t.states())
    }

    /// Next states `[len * obs_size]`, aligned with [`observations`](Self::observations).
    pub fn next_observations(&self) -> Vec<f32> {
        self.concat(|t| t.next_states())
    }

    /// Legal-action masks `[len * n_actions]`.
    pub fn action_masks(&self) -> Vec<f32> {
        self.concat(|t| t.action_masks())
    }

    pub fn actions(&self) -> Vec<u32> {
        self.concat(|t| t.actions())
    }

    pub fn rewards(&self) -> Vec<f32> {
        self.concat(|t| t.rewards())
    }

    /// Episode-boundary flags for return computation.
    ///
    /// The last step of every episode is marked, terminal or truncated, so
    /// discounted returns never leak across episodes.
    pub fn episode_ends(&self) -> Vec<bool> {
        let mut flags = Vec::with_capacity(self.len());
        for t in &self.trajectories {
            let n = t.len();
            flags.extend((0..n).map(|i| i + 1 == n));
        }
        flags
    }

    /// Terminal flags for bootstrapping: only true terminal steps are set.
    pub fn terminals(&self) -> Vec<bool> {
        let mut flags = Vec::with_capacity(self.len());
        for t in &self.trajectories {
            flags.extend(t.terminals());
        }
        flags
    }

    /// Undiscounted return of each episode.
    pub fn episode_returns(&self) -> Vec<f32> {
        self.trajectories.iter().map(Trajectory::episode_return).collect()
    }

    pub fn episode_lengths(&self) -> Vec<usize> {
        self.trajectories.iter().map(Trajectory::len).collect()
    }

    pub fn max_tiles(&self) -> Vec<u32> {
        self.trajectories.iter().filter_map(Trajectory::max_tile).collect()
    }

    /// Iterate over every transition, episodes in order.
    pub fn transitions(&self) -> impl Iterator<Item = Transition<'_>> {
        self.trajectories.iter().flat_map(Trajectory::transitions)
    }

    fn concat<T: Clone>(&self, field: impl Fn(&Trajectory) -> &[T]) -> Vec<T> {
        let mut out = Vec::new();
        for t in &self.trajectories {
            out.extend_from_slice(field(t));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step(end: EpisodeEnd) -> Trajectory {
        let mut t = Trajectory::new(&[0.0, 0.0], 2);
        t.push(&[1.0, 1.0], 0, 1.0, &[1.0, 0.0]);
        t.push(&[1.0, 0.0], 1, 2.0, &[2.0, 0.0]);
        t.finish(end);
        t
    }

    #[test]
    fn test_trajectory_keeps_final_observation() {
        let t = two_step(EpisodeEnd::Terminal);
        assert_eq!(t.len(), 2);
        assert_eq!(t.states(), &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(t.next_states(), &[1.0, 0.0, 2.0, 0.0]);
        assert_eq!(t.observation(2), &[2.0, 0.0]);
        assert_eq!(t.episode_return(), 3.0);
    }

    #[test]
    fn test_transition_flags() {
        let terminal = two_step(EpisodeEnd::Terminal);
        let steps: Vec<_> = terminal.transitions().collect();
        assert!(!steps[0].done());
        assert!(steps[1].terminal && !steps[1].truncated);
        assert_eq!(steps[1].action_mask, &[1.0, 0.0]);

        let truncated = two_step(EpisodeEnd::Truncated);
        let last = truncated.transition(1);
        assert!(last.truncated && !last.terminal);
        assert_eq!(truncated.terminals(), vec![false, false]);
    }

    #[test]
    fn test_batch_flattening() {
        let batch = TrajectoryBatch::new(
            vec![two_step(EpisodeEnd::Terminal), two_step(EpisodeEnd::Truncated)],
            2,
            2,
        );
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.rewards(), vec![1.0, 2.0, 1.0, 2.0]);
        assert_eq!(batch.episode_ends(), vec![false, true, false, true]);
        assert_eq!(batch.terminals(), vec![false, true, false, false]);
        assert_eq!(batch.observations().len(), 8);
        assert_eq!(batch.next_observations().len(), 8);
        assert_eq!(batch.action_masks().len(), 8);
        assert_eq!(batch.episode_returns(), vec![3.0, 3.0]);
        assert_eq!(batch.transitions().count(), 4);
    }
}
