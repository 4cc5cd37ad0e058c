use crate::{ProcessedFrame, StackedFrames};
use anyhow::{bail, Result};
use dqn_core::{DqnError, Env, Step};
use ndarray::{concatenate, Axis};
use std::collections::VecDeque;

/// Keeps the `K` most recent frames.
#[derive(Clone, Debug)]
pub struct FrameStacker {
    stack_size: usize,
    frames: VecDeque<ProcessedFrame>,
}

impl FrameStacker {
    /// Constructs a stacker of `stack_size` frames.
    pub fn new(stack_size: usize) -> Result<Self> {
        if stack_size == 0 {
            return Err(DqnError::InvalidConfig("stack_size must be positive".into()).into());
        }
        Ok(Self {
            stack_size,
            frames: VecDeque::with_capacity(stack_size),
        })
    }

    /// The number of stacked frames.
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Fills the stack with copies of the first frame of an episode.
    pub fn reset(&mut self, frame: ProcessedFrame) -> Result<StackedFrames> {
        self.frames.clear();
        for _ in 0..self.stack_size {
            self.frames.push_back(frame.clone());
        }
        self.stacked()
    }

    /// Appends a frame, evicting the oldest one.
    pub fn observe(&mut self, frame: ProcessedFrame) -> Result<StackedFrames> {
        if self.frames.is_empty() {
            bail!(DqnError::EnvContract("frame stack used before reset".into()));
        }
        self.frames.pop_front();
        self.frames.push_back(frame);
        self.stacked()
    }

    fn stacked(&self) -> Result<StackedFrames> {
        let views = self.frames.iter().map(|f| f.0.view()).collect::<Vec<_>>();
        let stacked = concatenate(Axis(0), &views)
            .map_err(|e| DqnError::EnvContract(format!("failed to stack frames: {}", e)))?;
        Ok(StackedFrames(stacked))
    }
}

/// Stacks the frames of the inner environment with a [`FrameStacker`].
pub struct StackFrames<E: Env<Obs = ProcessedFrame>> {
    env: E,
    stacker: FrameStacker,
}

impl<E: Env<Obs = ProcessedFrame>> StackFrames<E> {
    /// Wraps `env`, stacking `stack_size` frames.
    pub fn new(env: E, stack_size: usize) -> Result<Self> {
        Ok(Self {
            env,
            stacker: FrameStacker::new(stack_size)?,
        })
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }
}

impl<E: Env<Obs = ProcessedFrame>> Env for StackFrames<E> {
    type Obs = StackedFrames;
    type Act = E::Act;
    type Info = E::Info;

    fn reset(&mut self) -> Result<StackedFrames> {
        let obs = self.env.reset()?;
        self.stacker.reset(obs)
    }

    fn step(&mut self, a: &E::Act) -> Result<Step<Self>> {
        let step = self.env.step(a)?;
        let obs = self.stacker.observe(step.obs)?;
        Ok(Step::new(obs, step.act, step.reward, step.is_done, step.info))
    }

    fn obs_shape(&self) -> Vec<usize> {
        let mut shape = self.env.obs_shape();
        shape[0] *= self.stacker.stack_size();
        shape
    }

    fn n_actions(&self) -> usize {
        self.env.n_actions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn frame(v: f32) -> ProcessedFrame {
        ProcessedFrame(Array3::from_elem((1, 2, 2), v))
    }

    fn channel_values(obs: &StackedFrames) -> Vec<f32> {
        obs.0.outer_iter().map(|c| c[[0, 0]]).collect()
    }

    #[test]
    fn test_reset_replicates_first_frame() -> Result<()> {
        let mut stacker = FrameStacker::new(4)?;
        let obs = stacker.reset(frame(0.5))?;
        assert_eq!(obs.0.shape(), &[4, 2, 2]);
        assert_eq!(channel_values(&obs), vec![0.5; 4]);
        Ok(())
    }

    #[test]
    fn test_oldest_first() -> Result<()> {
        let mut stacker = FrameStacker::new(4)?;
        stacker.reset(frame(0.0))?;
        let mut obs = None;
        for v in [0.1, 0.2, 0.3, 0.4] {
            obs = Some(stacker.observe(frame(v))?);
        }
        let obs = obs.unwrap();
        assert_eq!(channel_values(&obs), vec![0.1, 0.2, 0.3, 0.4]);

        // The fifth frame evicts the oldest one.
        let obs = stacker.observe(frame(0.5))?;
        assert_eq!(channel_values(&obs), vec![0.2, 0.3, 0.4, 0.5]);
        Ok(())
    }

    #[test]
    fn test_observe_before_reset() -> Result<()> {
        let mut stacker = FrameStacker::new(2)?;
        assert!(stacker.observe(frame(0.0)).is_err());
        assert!(FrameStacker::new(0).is_err());
        Ok(())
    }
}
