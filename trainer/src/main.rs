use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use burn::backend::Autodiff;
use clap::Parser;
use policy_gradient::{
    build_conv_networks, build_mlp_networks, AlgorithmKind, Architecture, CSVLogger, ConsoleLogger,
    Game2048Env, MultiLogger, Trainer, TrainingConfig, TrainingReport,
};

use crate::cli::Args;

mod cli;

#[cfg(not(feature = "wgpu"))]
type TrainBackend = Autodiff<burn::backend::NdArray<f32>>;
#[cfg(feature = "wgpu")]
type TrainBackend = Autodiff<burn::backend::Wgpu>;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let base = match &args.config {
        Some(path) => TrainingConfig::load(path)?,
        None => TrainingConfig::default(),
    };
    let config = args.apply(base);
    config.validate().context("invalid configuration")?;

    if args.print_config {
        println!("{}", config.to_json());
        return Ok(());
    }

    let algorithms = if args.compare {
        AlgorithmKind::ALL.to_vec()
    } else {
        vec![config.algorithm]
    };

    let mut reports = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let config = config.clone().with_algorithm(algorithm);
        let csv = args
            .csv
            .as_ref()
            .map(|path| if args.compare { suffixed(path, algorithm) } else { path.clone() });
        let report = train(config, csv).with_context(|| format!("training {} failed", algorithm))?;
        reports.push(report);
    }

    for report in &reports {
        log::info!(
            "{:<20} final mean return {:>10.1}  best tile {:>6}",
            report.algorithm,
            report.final_mean_return(10).unwrap_or(0.0),
            report.best_tile()
        );
    }

    if let Some(path) = &args.summary {
        write_summary(path, &reports)?;
    }
    Ok(())
}

fn train(config: TrainingConfig, csv: Option<PathBuf>) -> anyhow::Result<TrainingReport> {
    let device = Default::default();
    let env = Game2048Env::new(config.batch_size, config.seed);

    let mut logger = MultiLogger::new().add(ConsoleLogger::new(config.log_interval));
    if let Some(path) = csv {
        let csv_logger =
            CSVLogger::new(&path).with_context(|| format!("cannot create {}", path.display()))?;
        logger = logger.add(csv_logger);
    }

    let report = match config.architecture {
        Architecture::Mlp => {
            let networks = build_mlp_networks::<TrainBackend>(&config, &device);
            Trainer::new(config, env, networks, device)?
                .with_logger(logger)
                .run()?
        }
        Architecture::Conv => {
            let networks = build_conv_networks::<TrainBackend>(&config, &device);
            Trainer::new(config, env, networks, device)?
                .with_logger(logger)
                .run()?
        }
    };
    Ok(report)
}

/// `metrics.csv` -> `metrics-actor-critic.csv`
fn suffixed(path: &Path, algorithm: AlgorithmKind) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "metrics".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, algorithm, ext.to_string_lossy()),
        None => format!("{}-{}", stem, algorithm),
    };
    path.with_file_name(name)
}

fn write_summary(path: &Path, reports: &[TrainingReport]) -> anyhow::Result<()> {
    let runs: Vec<_> = reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "algorithm": r.algorithm,
                "iterations": r.history.len(),
                "total_episodes": r.total_episodes,
                "total_env_steps": r.total_env_steps,
                "best_tile": r.best_tile(),
                "elapsed_secs": r.elapsed.as_secs_f64(),
                "mean_returns": r.mean_returns(),
            })
        })
        .collect();
    let json = serde_json::to_string_pretty(&runs)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
