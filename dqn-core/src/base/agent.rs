//! Agent.
use super::{Env, Policy, Transition};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// The agent owns its replay memory: transitions are handed over with
/// [`Agent::store_transition`] and consumed by [`Agent::learn`].
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Stores a transition for later learning steps.
    fn store_transition(&mut self, tr: Transition<E::Obs>) -> Result<()>;

    /// Performs a learning step.
    ///
    /// Returns `Ok(None)` when the step was skipped, for example because
    /// not enough transitions have been stored yet.
    fn learn(&mut self) -> Result<Option<Record>>;

    /// Current exploration rate.
    fn epsilon(&self) -> f32;

    /// Save the parameters of the agent in the given directory.
    /// This method commonly creates a number of files consisting the agent
    /// in the directory. The DQN agent saves the online and the target
    /// networks.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
