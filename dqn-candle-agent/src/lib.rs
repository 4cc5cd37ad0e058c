//! DQN agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! The agent ([`dqn::Dqn`]) keeps an online and a target action-value
//! network ([`dqn::DqnModel`]), selects actions epsilon-greedily and learns
//! from its own replay memory with one-step TD targets. Action-value
//! functions implement [`model::ValueFunction`]; [`cnn::Cnn`] is the
//! convolutional network of the DQN paper and [`mlp::Mlp`] a multilayer
//! perceptron for low-dimensional observations.
pub mod cnn;
pub mod dqn;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod util;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU with the given ordinal.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
