//! Convolutional network over the `[4, 4, 31]` one-hot board.
//!
//! The flat observation is reshaped to `[batch, 4, 4, 31]` and permuted to
//! channels-first `[batch, 31, 4, 4]`. Two valid 2x2 convolutions reduce the
//! board to 2x2, followed by a fully connected hidden layer and the head.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

use super::orthogonal::{OrthogonalLinear, OrthogonalLinearConfig};
use super::{PolicyNetwork, ValueNetwork, HIDDEN_GAIN};

/// Spatial size after two valid 2x2 convolutions on a 4x4 board.
const CONV_OUTPUT_SIDE: usize = 2;

/// Configuration for [`BoardConvNet`].
#[derive(Debug, Clone)]
pub struct BoardConvNetConfig {
    /// Board side length (4 for 2048).
    pub board_size: usize,
    /// One-hot channels per cell (31 for 2048).
    pub channels: usize,
    pub output_size: usize,
    /// Output channels of the two convolutions (default: [64, 128]).
    pub conv_channels: [usize; 2],
    /// Width of the fully connected hidden layer (default: 256).
    pub hidden_size: usize,
    pub output_gain: f64,
    pub seed: u64,
}

impl BoardConvNetConfig {
    pub fn new(board_size: usize, channels: usize, output_size: usize) -> Self {
        Self {
            board_size,
            channels,
            output_size,
            conv_channels: [64, 128],
            hidden_size: 256,
            output_gain: 1.0,
            seed: 0,
        }
    }

    pub fn with_conv_channels(mut self, conv_channels: [usize; 2]) -> Self {
        self.conv_channels = conv_channels;
        self
    }

    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_output_gain(mut self, gain: f64) -> Self {
        self.output_gain = gain;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Initialize the network.
    ///
    /// Convolution weights use Burn's default initializer; the linear layers
    /// are orthogonal and seeded.
    pub fn init<B: Backend>(&self, device: &B::Device) -> BoardConvNet<B> {
        debug_assert_eq!(self.board_size, 4, "two 2x2 convolutions assume a 4x4 board");
        let [c1, c2] = self.conv_channels;
        let flat = c2 * CONV_OUTPUT_SIDE * CONV_OUTPUT_SIDE;

        BoardConvNet {
            conv1: Conv2dConfig::new([self.channels, c1], [2, 2]).init(device),
            conv2: Conv2dConfig::new([c1, c2], [2, 2]).init(device),
            hidden: OrthogonalLinearConfig::new(flat, self.hidden_size)
                .with_gain(HIDDEN_GAIN)
                .with_seed(self.seed)
                .init(device),
            head: OrthogonalLinearConfig::new(self.hidden_size, self.output_size)
                .with_gain(self.output_gain)
                .with_seed(self.seed.wrapping_add(1))
                .init(device),
            board_size: self.board_size,
            channels: self.channels,
        }
    }
}

/// Two-layer convolutional network with a linear head.
#[derive(Module, Debug)]
pub struct BoardConvNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    hidden: OrthogonalLinear<B>,
    head: OrthogonalLinear<B>,
    board_size: usize,
    channels: usize,
}

impl<B: Backend> BoardConvNet<B> {
    /// [batch, board_size * board_size * channels] -> [batch, output_size]
    pub fn forward(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, _] = obs.dims();
        let x = obs
            .reshape([batch, self.board_size, self.board_size, self.channels])
            .permute([0, 3, 1, 2]);

        let x = relu(self.conv1.forward(x));
        let x = relu(self.conv2.forward(x));
        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = relu(self.hidden.forward(x));
        self.head.forward(x)
    }

    pub fn input_size(&self) -> usize {
        self.board_size * self.board_size * self.channels
    }

    pub fn output_size(&self) -> usize {
        self.head.d_output()
    }
}

impl<B: Backend> PolicyNetwork<B> for BoardConvNet<B> {
    fn logits(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(obs)
    }

    fn input_size(&self) -> usize {
        BoardConvNet::input_size(self)
    }

    fn n_actions(&self) -> usize {
        self.output_size()
    }
}

impl<B: Backend> ValueNetwork<B> for BoardConvNet<B> {
    fn values(&self, obs: Tensor<B, 2>) -> Tensor<B, 1> {
        self.forward(obs).flatten(0, 1)
    }

    fn input_size(&self) -> usize {
        BoardConvNet::input_size(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_conv_net_shapes() {
        let device = Default::default();
        let config = BoardConvNetConfig::new(4, 31, 4)
            .with_conv_channels([8, 16])
            .with_hidden_size(32);
        let net: BoardConvNet<B> = config.init(&device);

        let obs = Tensor::<B, 2>::zeros([5, 4 * 4 * 31], &device);
        assert_eq!(net.logits(obs.clone()).dims(), [5, 4]);
        assert_eq!(PolicyNetwork::input_size(&net), 496);
        assert_eq!(PolicyNetwork::n_actions(&net), 4);

        let value_net: BoardConvNet<B> = BoardConvNetConfig::new(4, 31, 1)
            .with_conv_channels([8, 16])
            .with_hidden_size(32)
            .init(&device);
        assert_eq!(value_net.values(obs).dims(), [5]);
    }
}
