//! Policy and value networks.
//!
//! - `orthogonal`: seeded orthogonal initialization for linear layers
//! - `mlp`: fully connected network over the flat observation
//! - `conv`: convolutional network over the one-hot board
//!
//! Both architectures implement [`PolicyNetwork`] (logits over actions) and
//! [`ValueNetwork`] (scalar state value). Policy and value networks are always
//! separate modules with separate parameters.

pub mod conv;
pub mod mlp;
pub mod orthogonal;

use std::fmt;
use std::str::FromStr;

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::runners::config::ConfigError;

pub use conv::{BoardConvNet, BoardConvNetConfig};
pub use mlp::{Mlp, MlpConfig};
pub use orthogonal::{OrthogonalLinear, OrthogonalLinearConfig};

/// sqrt(2), gain for ReLU hidden layers.
pub const HIDDEN_GAIN: f64 = std::f64::consts::SQRT_2;
/// Small gain for near-uniform initial policy.
pub const POLICY_GAIN: f64 = 0.01;
/// Standard gain for value head.
pub const VALUE_GAIN: f64 = 1.0;

/// Maps observations to action logits.
pub trait PolicyNetwork<B: Backend>: Module<B> {
    /// [batch, obs_size] -> [batch, n_actions]
    fn logits(&self, obs: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Expected observation size.
    fn input_size(&self) -> usize;

    fn n_actions(&self) -> usize;
}

/// Maps observations to state values.
pub trait ValueNetwork<B: Backend>: Module<B> {
    /// [batch, obs_size] -> [batch]
    fn values(&self, obs: Tensor<B, 2>) -> Tensor<B, 1>;

    /// Expected observation size.
    fn input_size(&self) -> usize;
}

/// Network architecture choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    Mlp,
    Conv,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::Mlp => write!(f, "mlp"),
            Architecture::Conv => write!(f, "conv"),
        }
    }
}

impl FromStr for Architecture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mlp" => Ok(Architecture::Mlp),
            "conv" | "cnn" => Ok(Architecture::Conv),
            _ => Err(ConfigError::UnknownArchitecture(s.to_string())),
        }
    }
}
