//! Error types for training.

use std::fmt;

use thiserror::Error;

use crate::runners::config::ConfigError;

/// Which network produced a loss value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Policy,
    Value,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkKind::Policy => write!(f, "policy"),
            NetworkKind::Value => write!(f, "value"),
        }
    }
}

/// Fatal errors raised while training.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Configuration rejected before the first iteration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A loss evaluated to NaN or infinity. The run is aborted.
    #[error("non-finite {network} loss ({value}) at iteration {iteration}")]
    NonFiniteLoss {
        iteration: usize,
        network: NetworkKind,
        value: f32,
    },

    /// Reading tensor data back to the host failed.
    #[error("tensor data conversion failed: {0}")]
    TensorData(String),

    /// Environment and network disagree on shapes.
    #[error("{what} mismatch: environment has {env}, network expects {model}")]
    ShapeMismatch {
        what: &'static str,
        env: usize,
        model: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrainingError {
    pub(crate) fn tensor_data(err: impl fmt::Debug) -> Self {
        TrainingError::TensorData(format!("{:?}", err))
    }
}

/// Result alias for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;
