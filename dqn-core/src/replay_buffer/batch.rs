//! A batch of transitions.

/// A batch of transitions sampled from [`ReplayMemory`](super::ReplayMemory).
///
/// All fields are aligned by sample position.
pub struct TransitionBatch<O> {
    /// Observations.
    pub obs: O,

    /// Action indices.
    pub act: Vec<usize>,

    /// Next observations.
    pub next_obs: O,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Episode-end flags.
    pub is_done: Vec<bool>,

    /// Positions of the samples in the replay memory.
    pub ix_sample: Vec<usize>,
}

impl<O> TransitionBatch<O> {
    /// Unpacks the batch into `(obs, act, next_obs, reward, is_done, ix_sample)`.
    #[allow(clippy::type_complexity)]
    pub fn unpack(self) -> (O, Vec<usize>, O, Vec<f32>, Vec<bool>, Vec<usize>) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_done,
            self.ix_sample,
        )
    }

    /// The number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}
