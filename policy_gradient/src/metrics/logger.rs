//! Metrics logging for training runs.
//!
//! Provides flexible logging infrastructure for tracking training progress
//! through the `log` facade or to CSV files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use super::episode_stats::EpisodeStats;

/// A snapshot of training metrics at one iteration.
#[derive(Debug, Clone, Default)]
pub struct TrainingSnapshot {
    /// Training iteration (0-based)
    pub iteration: usize,
    /// Total environment steps so far
    pub env_steps: usize,
    /// Total episodes completed so far
    pub episodes: usize,
    /// Episode statistics of this iteration
    pub stats: EpisodeStats,
    /// Mean return over the recent episode window
    pub recent_mean_return: f32,
    pub policy_loss: Option<f32>,
    pub value_loss: Option<f32>,
    pub entropy: Option<f32>,
    pub policy_learning_rate: Option<f64>,
    pub value_learning_rate: Option<f64>,
}

impl TrainingSnapshot {
    /// Create a new snapshot with basic metrics.
    pub fn new(iteration: usize, env_steps: usize, episodes: usize, stats: EpisodeStats) -> Self {
        Self {
            iteration,
            env_steps,
            episodes,
            stats,
            recent_mean_return: stats.mean_return,
            ..Default::default()
        }
    }

    pub fn with_recent_mean_return(mut self, mean: f32) -> Self {
        self.recent_mean_return = mean;
        self
    }

    /// Add loss metrics.
    pub fn with_losses(
        mut self,
        policy_loss: Option<f32>,
        value_loss: Option<f32>,
        entropy: Option<f32>,
    ) -> Self {
        self.policy_loss = policy_loss;
        self.value_loss = value_loss;
        self.entropy = entropy;
        self
    }

    /// Add learning rates.
    pub fn with_learning_rates(mut self, policy: Option<f64>, value: Option<f64>) -> Self {
        self.policy_learning_rate = policy;
        self.value_learning_rate = value;
        self
    }
}

/// Trait for metrics loggers.
pub trait MetricsLogger: Send {
    /// Log a training snapshot.
    fn log(&mut self, snapshot: &TrainingSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self) {}
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

/// Logger that reports progress through the `log` facade.
pub struct ConsoleLogger {
    /// Log every N iterations
    log_interval: usize,
    /// Last logged iteration
    last_logged: Option<usize>,
    start_time: Instant,
}

impl ConsoleLogger {
    /// Create a new console logger.
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
            last_logged: None,
            start_time: Instant::now(),
        }
    }

    fn should_log(&self, iteration: usize) -> bool {
        match self.last_logged {
            None => true,
            Some(last) => iteration >= last + self.log_interval,
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(1)
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        if !self.should_log(snapshot.iteration) {
            return;
        }
        self.last_logged = Some(snapshot.iteration);

        let stats = &snapshot.stats;
        log::info!(
            "iter {:>6} | steps {:>10} | return {:>9.1} (min {:.0}, max {:.0}, avg100 {:.1}) | len {:>7.1} | tile {:>5} | pi_loss {} | v_loss {} | ent {} | {:.1}s",
            snapshot.iteration,
            snapshot.env_steps,
            stats.mean_return,
            stats.min_return,
            stats.max_return,
            snapshot.recent_mean_return,
            stats.mean_length,
            stats.max_tile,
            fmt_opt(snapshot.policy_loss, 4),
            fmt_opt(snapshot.value_loss, 4),
            fmt_opt(snapshot.entropy, 3),
            self.start_time.elapsed().as_secs_f32(),
        );
    }
}

/// CSV file logger.
pub struct CSVLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CSVLogger {
    /// Create a new CSV logger, writing the header row.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "iteration,env_steps,episodes,mean_return,std_return,min_return,max_return,recent_mean_return,mean_length,max_tile,policy_loss,value_loss,entropy,policy_lr,value_lr,elapsed_secs"
        )?;

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }
}

impl MetricsLogger for CSVLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        let stats = &snapshot.stats;
        let opt = |v: Option<f32>| v.map(|x| x.to_string()).unwrap_or_default();
        let opt_lr = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

        let result = writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{:.3}",
            snapshot.iteration,
            snapshot.env_steps,
            snapshot.episodes,
            stats.mean_return,
            stats.std_return,
            stats.min_return,
            stats.max_return,
            snapshot.recent_mean_return,
            stats.mean_length,
            stats.max_tile,
            opt(snapshot.policy_loss),
            opt(snapshot.value_loss),
            opt(snapshot.entropy),
            opt_lr(snapshot.policy_learning_rate),
            opt_lr(snapshot.value_learning_rate),
            self.start_time.elapsed().as_secs_f64(),
        );
        if let Err(e) = result {
            log::warn!("failed to write metrics row: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("failed to flush metrics file: {}", e);
        }
    }
}

impl Drop for CSVLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Logger that fans out to several loggers.
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logger.
    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        for logger in &mut self.loggers {
            logger.log(snapshot);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}
