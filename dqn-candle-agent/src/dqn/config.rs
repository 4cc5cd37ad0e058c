//! Configuration of DQN agent.
use super::{explorer::EpsilonGreedy, DqnModelConfig};
use crate::{util::CriticLoss, util::OutDim, Device};
use anyhow::Result;
use dqn_core::ReplayMemoryConfig;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Constructs [`Dqn`](super::Dqn).
///
/// `Q` is the configuration of the action-value function.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig<Q>
where
    Q: OutDim,
{
    pub(super) model_config: DqnModelConfig<Q>,
    pub(super) memory_config: ReplayMemoryConfig,
    pub(super) batch_size: usize,
    pub(super) discount_factor: f64,
    pub(super) sync_interval: usize,
    pub(super) explorer: EpsilonGreedy,
    #[serde(default)]
    pub(super) critic_loss: CriticLoss,
    pub(super) seed: u64,
    pub device: Option<Device>,
}

impl<Q> Default for DqnConfig<Q>
where
    Q: OutDim,
{
    /// Constructs DQN builder with default parameters.
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            memory_config: Default::default(),
            batch_size: 32,
            discount_factor: 0.99,
            sync_interval: 1000,
            explorer: Default::default(),
            critic_loss: CriticLoss::Mse,
            seed: 42,
            device: None,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: OutDim + Serialize + for<'de> Deserialize<'de>,
{
    /// Sets the configuration of the model.
    pub fn model_config(mut self, model_config: DqnModelConfig<Q>) -> Self {
        self.model_config = model_config;
        self
    }

    /// Sets the configuration of the action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.model_config = self.model_config.q_config(v);
        self
    }

    /// Sets the configuration of the replay memory.
    pub fn memory_config(mut self, v: ReplayMemoryConfig) -> Self {
        self.memory_config = v;
        self
    }

    /// Capacity of the replay memory.
    pub fn memory_capacity(mut self, v: usize) -> Self {
        self.memory_config = self.memory_config.capacity(v);
        self
    }

    /// Learning rate of the optimizer.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.model_config = self.model_config.learning_rate(lr);
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Interval of copying the online network into the target network, in learning steps.
    pub fn sync_interval(mut self, v: usize) -> Self {
        self.sync_interval = v;
        self
    }

    /// Explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Epsilon at the start of training.
    pub fn eps_start(mut self, v: f32) -> Self {
        self.explorer = self.explorer.eps_start(v);
        self
    }

    /// Lower bound of epsilon.
    pub fn eps_min(mut self, v: f32) -> Self {
        self.explorer = self.explorer.eps_min(v);
        self
    }

    /// Decrement of epsilon per learning step.
    pub fn eps_dec(mut self, v: f32) -> Self {
        self.explorer = self.explorer.eps_dec(v);
        self
    }

    /// Critic loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Seed of the random number generator used for exploration.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the output dimention of the dqn model of the DQN agent.
    pub fn out_dim(mut self, out_dim: usize) -> Self {
        self.model_config = self.model_config.out_dim(out_dim);
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {}", path_.display());
        Ok(b)
    }

    /// Saves [`DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {}", path_.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnn::CnnConfig;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let config = DqnConfig::default()
            .model_config(DqnModelConfig::default().q_config(CnnConfig::default()))
            .out_dim(3)
            .sync_interval(500)
            .explorer(EpsilonGreedy::default().eps_min(0.05))
            .eps_dec(1e-3)
            .learning_rate(1e-3)
            .memory_capacity(1000)
            .device(Device::Cpu);

        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        let config_ = DqnConfig::<CnnConfig>::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.model_config.get_out_dim(), Some(3));
        assert_eq!(config_.explorer.eps_min, 0.05);
        assert_eq!(config_.explorer.eps_dec, 1e-3);
        assert_eq!(config_.memory_config.capacity, 1000);
        Ok(())
    }
}
