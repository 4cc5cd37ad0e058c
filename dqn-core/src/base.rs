//! Core functionalities.
mod agent;
mod env;
mod policy;
mod replay_buffer;
mod step;
mod transition;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::{Info, Step};
pub use transition::Transition;

/// An observation of an environment.
///
/// Vectorized environments are not supported, so an object of this trait
/// holds a single observation.
pub trait Obs: Clone + Debug {
    /// Returns the shape of the observation, e.g. `[4, 84, 84]` for a stack
    /// of four 84x84 frames.
    fn shape(&self) -> Vec<usize>;
}

/// A discrete action of an environment.
///
/// Actions are identified by their index in `0..n_actions`.
pub trait Act: Clone + Debug + From<usize> {
    /// Returns the index of the action.
    fn index(&self) -> usize;
}
