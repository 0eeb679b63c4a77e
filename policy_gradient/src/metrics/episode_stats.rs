//! Episode summary statistics.

use std::collections::VecDeque;

use crate::core::TrajectoryBatch;

/// Summary of the episodes collected in one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeStats {
    pub episodes: usize,
    pub mean_return: f32,
    pub std_return: f32,
    pub min_return: f32,
    pub max_return: f32,
    pub mean_length: f32,
    /// Largest tile reached by any episode (0 if unknown)
    pub max_tile: u32,
}

impl EpisodeStats {
    /// Summarize the episodes of a batch.
    pub fn from_batch(batch: &TrajectoryBatch) -> Self {
        let returns = batch.episode_returns();
        let lengths = batch.episode_lengths();
        let max_tile = batch.max_tiles().into_iter().max().unwrap_or(0);
        Self::from_parts(&returns, &lengths, max_tile)
    }

    pub fn from_parts(returns: &[f32], lengths: &[usize], max_tile: u32) -> Self {
        if returns.is_empty() {
            return Self::default();
        }
        let n = returns.len() as f32;
        let mean = returns.iter().sum::<f32>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;

        Self {
            episodes: returns.len(),
            mean_return: mean,
            std_return: variance.sqrt(),
            min_return: returns.iter().copied().fold(f32::INFINITY, f32::min),
            max_return: returns.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            mean_length: lengths.iter().sum::<usize>() as f32 / lengths.len().max(1) as f32,
            max_tile,
        }
    }
}

/// Moving window over the most recent episode returns.
#[derive(Debug, Clone)]
pub struct RecentReturns {
    window: VecDeque<f32>,
    capacity: usize,
}

impl RecentReturns {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn extend(&mut self, returns: &[f32]) {
        for &r in returns {
            if self.window.len() == self.capacity {
                self.window.pop_front();
            }
            self.window.push_back(r);
        }
    }

    /// Mean over the window, 0 when empty.
    pub fn mean(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f32>() / self.window.len() as f32
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for RecentReturns {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_stats_from_parts() {
        let stats = EpisodeStats::from_parts(&[10.0, 20.0, 30.0], &[5, 10, 15], 256);
        assert_eq!(stats.episodes, 3);
        assert!((stats.mean_return - 20.0).abs() < 1e-6);
        assert_eq!(stats.min_return, 10.0);
        assert_eq!(stats.max_return, 30.0);
        assert!((stats.mean_length - 10.0).abs() < 1e-6);
        assert!((stats.std_return - (200.0f32 / 3.0).sqrt()).abs() < 1e-4);
        assert_eq!(stats.max_tile, 256);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(EpisodeStats::from_parts(&[], &[], 0), EpisodeStats::default());
    }

    #[test]
    fn test_recent_returns_window() {
        let mut recent = RecentReturns::new(3);
        assert_eq!(recent.mean(), 0.0);
        recent.extend(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(recent.len(), 3);
        assert!((recent.mean() - 3.0).abs() < 1e-6);
    }
}
