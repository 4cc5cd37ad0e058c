//! Interface of action-value functions used in the DQN agent.
use crate::util::OutDim;
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::VarBuilder;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Action-value function not owning its [`VarMap`] internally.
///
/// Parameters are created through the given [`VarBuilder`], so that the
/// owner of the [`VarMap`] can optimize, copy and save them.
///
/// [`VarMap`]: candle_nn::VarMap
pub trait ValueFunction {
    /// Configuration from which [`ValueFunction`] is constructed.
    type Config: Clone + Debug + PartialEq + Serialize + DeserializeOwned + OutDim;

    /// Builds [`ValueFunction`] with [`VarBuilder`] and [`ValueFunction::Config`].
    ///
    /// Fails if the configuration does not describe a valid network, e.g. an
    /// input too small for the convolution kernels.
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Returns action values of shape `[batch_size, n_actions]`.
    fn forward(&self, xs: &Tensor) -> Result<Tensor>;
}
