//! Gradient updates for the policy and value networks.
//!
//! Each network has its own Adam optimizer with global-norm gradient
//! clipping. One call to [`NetworkUpdate::apply`] performs a single gradient
//! step per trained network over the whole batch.

use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;

use crate::algorithms::action_policy::MaskedPolicyOutput;
use crate::algorithms::policy_loss::{entropy_loss, policy_gradient_loss, value_loss};
use crate::error::{NetworkKind, Result, TrainingError};
use crate::nn::{PolicyNetwork, ValueNetwork};
use crate::runners::config::TrainingConfig;
use crate::scheduling::{scheduler_for, LRScheduler};

/// The trained networks. The value network is absent for algorithms that
/// do not learn one.
#[derive(Debug, Clone)]
pub struct Networks<P, V> {
    pub policy: P,
    pub value: Option<V>,
}

impl<P, V> Networks<P, V> {
    pub fn new(policy: P, value: Option<V>) -> Self {
        Self { policy, value }
    }
}

/// Inputs of one update, flattened over all episodes of the batch.
pub struct UpdateBatch<'a, B: Backend> {
    /// [T, obs_size]
    pub observations: Tensor<B, 2>,
    /// [T * n_actions]
    pub action_masks: &'a [f32],
    /// [T]
    pub actions: &'a [u32],
    /// Policy-gradient weights [T]; `None` skips the policy update
    pub advantages: Option<&'a [f32]>,
    /// Value regression targets [T]; `None` skips the value update
    pub value_targets: Option<&'a [f32]>,
}

/// Losses and learning rates of one update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateStats {
    pub policy_loss: Option<f32>,
    pub value_loss: Option<f32>,
    pub entropy: Option<f32>,
    pub policy_learning_rate: Option<f64>,
    pub value_learning_rate: Option<f64>,
}

/// Optimizer state for both networks.
pub struct NetworkUpdate<B, P, V>
where
    B: AutodiffBackend,
    P: AutodiffModule<B>,
    V: AutodiffModule<B>,
{
    policy_optimizer: OptimizerAdaptor<Adam, P, B>,
    value_optimizer: OptimizerAdaptor<Adam, V, B>,
    policy_schedule: Box<dyn LRScheduler>,
    value_schedule: Box<dyn LRScheduler>,
    entropy_coef: f32,
    /// Number of completed updates (drives the learning rate schedules)
    steps: usize,
}

impl<B, P, V> NetworkUpdate<B, P, V>
where
    B: AutodiffBackend,
    P: PolicyNetwork<B> + AutodiffModule<B>,
    V: ValueNetwork<B> + AutodiffModule<B>,
{
    /// Create optimizers and schedules from the training configuration.
    pub fn new(config: &TrainingConfig) -> Self {
        let adam_config = AdamConfig::new()
            .with_epsilon(1e-5)
            .with_grad_clipping(Some(GradientClippingConfig::Norm(config.max_grad_norm)));

        Self {
            policy_optimizer: adam_config.init(),
            value_optimizer: adam_config.init(),
            policy_schedule: scheduler_for(config.policy_learning_rate, config.lr_decay),
            value_schedule: scheduler_for(config.value_learning_rate, config.lr_decay),
            entropy_coef: config.entropy_coef,
            steps: 0,
        }
    }

    /// Number of completed updates.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Current policy learning rate.
    pub fn policy_learning_rate(&self) -> f64 {
        self.policy_schedule.get_lr(self.steps)
    }

    /// Current value learning rate.
    pub fn value_learning_rate(&self) -> f64 {
        self.value_schedule.get_lr(self.steps)
    }

    /// Take one gradient step on each network that has inputs.
    ///
    /// The policy is updated before the value network. Each loss is checked
    /// before backpropagation; a NaN or infinite loss returns
    /// [`TrainingError::NonFiniteLoss`] without stepping that network.
    pub fn apply(
        &mut self,
        networks: &mut Networks<P, V>,
        batch: UpdateBatch<'_, B>,
        iteration: usize,
        device: &B::Device,
    ) -> Result<UpdateStats> {
        let mut stats = UpdateStats::default();

        if let Some(advantages) = batch.advantages {
            let lr = self.policy_learning_rate();
            let (loss, entropy) = self.update_policy(
                &mut networks.policy,
                batch.observations.clone(),
                batch.action_masks,
                batch.actions,
                advantages,
                lr,
                iteration,
                device,
            )?;
            stats.policy_loss = Some(loss);
            stats.entropy = Some(entropy);
            stats.policy_learning_rate = Some(lr);
        }

        if let (Some(targets), Some(value)) = (batch.value_targets, networks.value.as_mut()) {
            let lr = self.value_learning_rate();
            let loss = self.update_value(value, batch.observations, targets, lr, iteration, device)?;
            stats.value_loss = Some(loss);
            stats.value_learning_rate = Some(lr);
        }

        self.steps += 1;
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn update_policy(
        &mut self,
        policy: &mut P,
        observations: Tensor<B, 2>,
        action_masks: &[f32],
        actions: &[u32],
        advantages: &[f32],
        lr: f64,
        iteration: usize,
        device: &B::Device,
    ) -> Result<(f32, f32)> {
        let logits = policy.logits(observations);
        let output = MaskedPolicyOutput::from_mask_data(logits, action_masks, device);

        let log_probs = output.action_log_probs(actions, device);
        let weights = Tensor::<B, 1>::from_floats(advantages, device);
        let pg_loss = policy_gradient_loss(log_probs, weights);
        let entropy = output.entropy().mean();

        let pg_value = scalar(&pg_loss)?;
        let entropy_value = scalar(&entropy)?;

        let loss = if self.entropy_coef > 0.0 {
            pg_loss + entropy_loss(entropy).mul_scalar(self.entropy_coef)
        } else {
            pg_loss
        };
        let loss_value = scalar(&loss)?;
        if !loss_value.is_finite() {
            return Err(TrainingError::NonFiniteLoss {
                iteration,
                network: NetworkKind::Policy,
                value: loss_value,
            });
        }

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &*policy);
        *policy = self.policy_optimizer.step(lr, policy.clone(), grads);

        Ok((pg_value, entropy_value))
    }

    fn update_value(
        &mut self,
        value: &mut V,
        observations: Tensor<B, 2>,
        targets: &[f32],
        lr: f64,
        iteration: usize,
        device: &B::Device,
    ) -> Result<f32> {
        let predictions = value.values(observations);
        let targets = Tensor::<B, 1>::from_floats(targets, device);
        let loss = value_loss(predictions, targets);

        let loss_value = scalar(&loss)?;
        if !loss_value.is_finite() {
            return Err(TrainingError::NonFiniteLoss {
                iteration,
                network: NetworkKind::Value,
                value: loss_value,
            });
        }

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &*value);
        *value = self.value_optimizer.step(lr, value.clone(), grads);

        Ok(loss_value)
    }
}

/// Read the first element of a tensor back to the host.
pub(crate) fn scalar<B: Backend>(tensor: &Tensor<B, 1>) -> Result<f32> {
    let data = tensor
        .clone()
        .into_data()
        .to_vec::<f32>()
        .map_err(TrainingError::tensor_data)?;
    data.first()
        .copied()
        .ok_or_else(|| TrainingError::TensorData("empty tensor".to_string()))
}

/// Read a whole tensor back to the host.
pub(crate) fn to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(TrainingError::tensor_data)
}
