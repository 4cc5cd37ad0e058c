//! Environment.
use super::{Act, Info, Obs, Step};
use anyhow::Result;

/// Represents an environment, typically an MDP with a discrete action set.
///
/// Preprocessing stages are environments too: each stage owns its inner
/// environment and transforms what passes through [`Env::reset`] and
/// [`Env::step`].
pub trait Env {
    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Shape of observations emitted by this environment.
    fn obs_shape(&self) -> Vec<usize>;

    /// The number of discrete actions.
    fn n_actions(&self) -> usize;
}
