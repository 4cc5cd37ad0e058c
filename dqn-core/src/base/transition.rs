//! Transition.

/// One `(o_t, a_t, r_t, o_t+1, done)` tuple.
///
/// `O` is the observation container, either an environment observation or
/// its batch representation stored in a replay memory.
#[derive(Clone, Debug)]
pub struct Transition<O> {
    /// Observation before the action.
    pub obs: O,

    /// Index of the action taken.
    pub act: usize,

    /// Reward for the action.
    pub reward: f32,

    /// Observation after the action.
    pub next_obs: O,

    /// If the episode ended with this transition.
    pub is_done: bool,
}
