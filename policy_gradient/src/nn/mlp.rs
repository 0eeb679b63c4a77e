//! Fully connected network over the flattened observation.

use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::relu;

use super::orthogonal::{OrthogonalLinear, OrthogonalLinearConfig};
use super::{PolicyNetwork, ValueNetwork, HIDDEN_GAIN};

/// Configuration for [`Mlp`].
#[derive(Debug, Clone)]
pub struct MlpConfig {
    pub input_size: usize,
    pub output_size: usize,
    /// Hidden layer widths (default: [256, 256]).
    pub hidden_sizes: Vec<usize>,
    /// Gain of the output layer (0.01 for policy heads, 1.0 for value heads).
    pub output_gain: f64,
    pub seed: u64,
}

impl MlpConfig {
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            hidden_sizes: vec![256, 256],
            output_gain: 1.0,
            seed: 0,
        }
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: Vec<usize>) -> Self {
        self.hidden_sizes = hidden_sizes;
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

    /// Initialize the network. Layer `i` is seeded with `seed + i`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut layers = Vec::with_capacity(self.hidden_sizes.len());
        let mut d_in = self.input_size;
        for (i, &width) in self.hidden_sizes.iter().enumerate() {
            layers.push(
                OrthogonalLinearConfig::new(d_in, width)
                    .with_gain(HIDDEN_GAIN)
                    .with_seed(self.seed.wrapping_add(i as u64))
                    .init(device),
            );
            d_in = width;
        }

        let head = OrthogonalLinearConfig::new(d_in, self.output_size)
            .with_gain(self.output_gain)
            .with_seed(self.seed.wrapping_add(self.hidden_sizes.len() as u64))
            .init(device);

        Mlp { layers, head }
    }
}

/// ReLU multilayer perceptron.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<OrthogonalLinear<B>>,
    head: OrthogonalLinear<B>,
}

impl<B: Backend> Mlp<B> {
    /// [batch, input_size] -> [batch, output_size]
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let hidden = self
            .layers
            .iter()
            .fold(input, |x, layer| relu(layer.forward(x)));
        self.head.forward(hidden)
    }

    pub fn input_size(&self) -> usize {
        self.layers
            .first()
            .unwrap_or(&self.head)
            .d_input()
    }

    pub fn output_size(&self) -> usize {
        self.head.d_output()
    }
}

impl<B: Backend> PolicyNetwork<B> for Mlp<B> {
    fn logits(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(obs)
    }

    fn input_size(&self) -> usize {
        Mlp::input_size(self)
    }

    fn n_actions(&self) -> usize {
        self.output_size()
    }
}

impl<B: Backend> ValueNetwork<B> for Mlp<B> {
    fn values(&self, obs: Tensor<B, 2>) -> Tensor<B, 1> {
        self.forward(obs).flatten(0, 1)
    }

    fn input_size(&self) -> usize {
        Mlp::input_size(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_mlp_shapes() {
        let device = Default::default();
        let policy: Mlp<B> = MlpConfig::new(10, 4).with_hidden_sizes(vec![8, 8]).init(&device);
        let value: Mlp<B> = MlpConfig::new(10, 1).with_hidden_sizes(vec![8]).init(&device);

        let obs = Tensor::<B, 2>::ones([3, 10], &device);
        assert_eq!(policy.logits(obs.clone()).dims(), [3, 4]);
        assert_eq!(value.values(obs).dims(), [3]);
        assert_eq!(policy.output_size(), 4);
        assert_eq!(policy.input_size(), 10);
    }

    #[test]
    fn test_small_policy_gain_gives_near_uniform_logits() {
        let device = Default::default();
        let policy: Mlp<B> = MlpConfig::new(10, 4)
            .with_hidden_sizes(vec![16])
            .with_output_gain(0.01)
            .init(&device);
        let logits = policy
            .logits(Tensor::<B, 2>::ones([1, 10], &device))
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert!(logits.iter().all(|l| l.abs() < 0.5));
    }

    #[test]
    fn test_seeded_init_is_reproducible() {
        let device = Default::default();
        let config = MlpConfig::new(6, 2).with_hidden_sizes(vec![5]).with_seed(9);
        let a: Mlp<B> = config.init(&device);
        let b: Mlp<B> = config.init(&device);
        let obs = Tensor::<B, 2>::ones([2, 6], &device);
        let ya = a.forward(obs.clone()).into_data().to_vec::<f32>().unwrap();
        let yb = b.forward(obs).into_data().to_vec::<f32>().unwrap();
        assert_eq!(ya, yb);
    }
}
