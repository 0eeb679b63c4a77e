//! Training metrics.

pub mod episode_stats;
pub mod logger;

pub use episode_stats::{EpisodeStats, RecentReturns};
pub use logger::{CSVLogger, ConsoleLogger, MetricsLogger, MultiLogger, TrainingSnapshot};
