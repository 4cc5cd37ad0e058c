//! Fixed-capacity ring replay memory.
use super::{ReplayMemoryConfig, SubBatch, TransitionBatch};
use crate::{error::DqnError, ExperienceBufferBase, ReplayBufferBase, Transition};
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, seq::index, SeedableRng};

/// A fixed-capacity circular buffer of transitions.
///
/// Transitions are written at `counter % capacity`, where `counter` is the
/// total number of pushes so far. Once the memory is full, each push
/// overwrites the oldest transition, so the memory always holds the
/// `min(counter, capacity)` most recent transitions.
pub struct ReplayMemory<O>
where
    O: SubBatch,
{
    capacity: usize,
    counter: usize,
    obs: O,
    act: Vec<usize>,
    next_obs: O,
    reward: Vec<f32>,
    is_done: Vec<bool>,
    rng: StdRng,
}

impl<O> ReplayMemory<O>
where
    O: SubBatch,
{
    /// Maximum number of transitions held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of transitions pushed so far.
    pub fn counter(&self) -> usize {
        self.counter
    }

    fn sample_act(&self, ixs: &[usize]) -> Vec<usize> {
        ixs.iter().map(|&ix| self.act[ix]).collect()
    }

    fn sample_reward(&self, ixs: &[usize]) -> Vec<f32> {
        ixs.iter().map(|&ix| self.reward[ix]).collect()
    }

    fn sample_is_done(&self, ixs: &[usize]) -> Vec<bool> {
        ixs.iter().map(|&ix| self.is_done[ix]).collect()
    }
}

impl<O> ExperienceBufferBase for ReplayMemory<O>
where
    O: SubBatch,
{
    type Item = Transition<O>;

    fn len(&self) -> usize {
        self.counter.min(self.capacity)
    }

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        // Nothing is written unless both observations fit the storage.
        self.obs.check(&tr.obs)?;
        self.next_obs.check(&tr.next_obs)?;

        let i = self.counter % self.capacity;
        self.obs.push(i, &tr.obs)?;
        self.next_obs.push(i, &tr.next_obs)?;
        self.act[i] = tr.act;
        self.reward[i] = tr.reward;
        self.is_done[i] = tr.is_done;
        self.counter += 1;
        trace!("Stored transition at {}", i);

        Ok(())
    }
}

impl<O> ReplayBufferBase for ReplayMemory<O>
where
    O: SubBatch,
{
    type Config = ReplayMemoryConfig;
    type Batch = TransitionBatch<O>;

    fn build(config: &Self::Config) -> Result<Self> {
        let capacity = config.capacity;
        if capacity == 0 {
            return Err(
                DqnError::InvalidConfig("capacity of replay memory must be positive".into())
                    .into(),
            );
        }

        Ok(Self {
            capacity,
            counter: 0,
            obs: O::new(capacity),
            act: vec![0; capacity],
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            is_done: vec![false; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Samples `size` distinct transitions uniformly without replacement.
    ///
    /// Fails with [`DqnError::InsufficientTransitions`] if fewer than `size`
    /// transitions are stored.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let len = self.len();
        if size == 0 {
            return Err(DqnError::InvalidConfig("batch size must be positive".into()).into());
        }
        if size > len {
            return Err(DqnError::InsufficientTransitions {
                requested: size,
                available: len,
            }
            .into());
        }

        let ixs = index::sample(&mut self.rng, len, size).into_vec();

        Ok(TransitionBatch {
            obs: self.obs.sample(&ixs),
            act: self.sample_act(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: self.sample_reward(&ixs),
            is_done: self.sample_is_done(&ixs),
            ix_sample: ixs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObsBatch;
    use std::collections::HashSet;

    fn transition(k: usize) -> Result<Transition<ObsBatch>> {
        Ok(Transition {
            obs: ObsBatch::from_sample(vec![2], vec![k as f32, 0.0])?,
            act: k % 3,
            reward: k as f32,
            next_obs: ObsBatch::from_sample(vec![2], vec![k as f32 + 1.0, 0.0])?,
            is_done: k % 5 == 4,
        })
    }

    fn memory(capacity: usize) -> Result<ReplayMemory<ObsBatch>> {
        ReplayMemory::build(&ReplayMemoryConfig::default().capacity(capacity))
    }

    #[test]
    fn test_retains_most_recent() -> Result<()> {
        let capacity = 7;
        let n = 23;
        let mut memory = memory(capacity)?;
        for k in 0..n {
            memory.push(transition(k)?)?;
        }
        assert_eq!(memory.len(), capacity);
        assert_eq!(memory.counter(), n);

        let batch = memory.batch(capacity)?;
        let rewards: HashSet<usize> = batch.reward.iter().map(|&r| r as usize).collect();
        let expected: HashSet<usize> = (n - capacity..n).collect();
        assert_eq!(rewards, expected);

        // Fields of a sampled transition stay aligned.
        for (j, &r) in batch.reward.iter().enumerate() {
            let k = r as usize;
            assert_eq!(batch.act[j], k % 3);
            assert_eq!(batch.is_done[j], k % 5 == 4);
            assert_eq!(batch.obs.get(j), &[k as f32, 0.0]);
            assert_eq!(batch.next_obs.get(j), &[k as f32 + 1.0, 0.0]);
        }
        Ok(())
    }

    #[test]
    fn test_ring_position() -> Result<()> {
        let mut memory = memory(3)?;
        for k in 0..4 {
            memory.push(transition(k)?)?;
        }
        // The fourth push overwrites position 3 % 3 == 0.
        assert_eq!(memory.reward, vec![3.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_batch_distinct_indices() -> Result<()> {
        let mut memory = memory(50)?;
        for k in 0..30 {
            memory.push(transition(k)?)?;
        }

        for _ in 0..100 {
            let batch = memory.batch(16)?;
            let ixs: HashSet<usize> = batch.ix_sample.iter().copied().collect();
            assert_eq!(batch.len(), 16);
            assert_eq!(ixs.len(), 16);
            assert!(batch.ix_sample.iter().all(|&ix| ix < 30));
        }
        Ok(())
    }

    #[test]
    fn test_insufficient_transitions() -> Result<()> {
        let mut memory = memory(10)?;
        for k in 0..3 {
            memory.push(transition(k)?)?;
        }

        let err = memory.batch(4).err().unwrap();
        assert_eq!(
            err.downcast_ref::<DqnError>(),
            Some(&DqnError::InsufficientTransitions {
                requested: 4,
                available: 3
            })
        );
        assert!(memory.batch(0).is_err());
        assert!(memory.batch(3).is_ok());
        Ok(())
    }

    #[test]
    fn test_rejected_push_keeps_memory_intact() -> Result<()> {
        let mut memory = memory(2)?;
        for k in 0..2 {
            memory.push(transition(k)?)?;
        }

        let bad = Transition {
            obs: ObsBatch::from_sample(vec![2], vec![99.0, 0.0])?,
            act: 2,
            reward: 99.0,
            next_obs: ObsBatch::from_sample(vec![3], vec![0.0; 3])?,
            is_done: true,
        };
        let err = memory.push(bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DqnError>(),
            Some(DqnError::ShapeMismatch { .. })
        ));
        assert_eq!(memory.counter(), 2);

        let batch = memory.batch(2)?;
        for (j, &r) in batch.reward.iter().enumerate() {
            let k = r as usize;
            assert!(k < 2);
            assert_eq!(batch.act[j], k % 3);
            assert_eq!(batch.obs.get(j), &[k as f32, 0.0]);
            assert_eq!(batch.next_obs.get(j), &[k as f32 + 1.0, 0.0]);
        }
        Ok(())
    }

    #[test]
    fn test_zero_capacity() {
        assert!(memory(0).is_err());
    }
}
