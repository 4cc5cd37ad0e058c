use crate::RawFrame;
use anyhow::Result;
use dqn_core::{DqnError, Env, Step};
use ndarray::Zip;

/// Repeats an action for several frames and max-pools the last two of them.
///
/// Some games render objects only on alternate frames; the pixel-wise
/// maximum of the two most recent frames makes them visible in every
/// observation.
///
/// [`Env::reset`] returns the first frame as is, while [`Env::step`] returns
/// max-pooled frames.
pub struct ActionRepeater<E: Env<Obs = RawFrame>> {
    env: E,
    repeat: usize,
    clip_reward: bool,
    frame_buffer: [Option<RawFrame>; 2],
}

impl<E: Env<Obs = RawFrame>> ActionRepeater<E> {
    /// Wraps `env`.
    ///
    /// * `repeat` - the number of frames an action is applied for.
    /// * `clip_reward` - clips the reward of every frame to `[-1, 1]` before summation.
    pub fn new(env: E, repeat: usize, clip_reward: bool) -> Result<Self> {
        if repeat == 0 {
            return Err(DqnError::InvalidConfig("repeat must be positive".into()).into());
        }

        Ok(Self {
            env,
            repeat,
            clip_reward,
            frame_buffer: [None, None],
        })
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    fn sub_step(&mut self, a: &E::Act, i: usize) -> Result<(f32, bool, E::Info)> {
        let step = self.env.step(a)?;
        let reward = match self.clip_reward {
            true => step.reward.clamp(-1.0, 1.0),
            false => step.reward,
        };
        self.frame_buffer[i % 2] = Some(step.obs);
        Ok((reward, step.is_done, step.info))
    }

    fn max_pool(&self) -> Result<RawFrame> {
        match &self.frame_buffer {
            [Some(f0), Some(f1)] => {
                if f0.0.shape() != f1.0.shape() {
                    return Err(DqnError::ShapeMismatch {
                        expected: f0.0.shape().to_vec(),
                        actual: f1.0.shape().to_vec(),
                    }
                    .into());
                }
                let frame = Zip::from(&f0.0)
                    .and(&f1.0)
                    .map_collect(|&a, &b| a.max(b));
                Ok(RawFrame(frame))
            }
            [Some(f), None] | [None, Some(f)] => Ok(f.clone()),
            [None, None] => Err(DqnError::EnvContract("no frame to max-pool".into()).into()),
        }
    }
}

impl<E: Env<Obs = RawFrame>> Env for ActionRepeater<E> {
    type Obs = RawFrame;
    type Act = E::Act;
    type Info = E::Info;

    fn reset(&mut self) -> Result<RawFrame> {
        let obs = self.env.reset()?;
        let (h, w, c) = obs.0.dim();
        self.frame_buffer = [Some(obs.clone()), Some(RawFrame::zeros(h, w, c))];
        Ok(obs)
    }

    fn step(&mut self, a: &E::Act) -> Result<Step<Self>> {
        let (mut total_reward, mut is_done, mut info) = self.sub_step(a, 0)?;

        for i in 1..self.repeat {
            if is_done {
                break;
            }
            let (reward, is_done_, info_) = self.sub_step(a, i)?;
            total_reward += reward;
            is_done = is_done_;
            info = info_;
        }

        let obs = self.max_pool()?;
        Ok(Step::new(obs, a.clone(), total_reward, is_done, info))
    }

    fn obs_shape(&self) -> Vec<usize> {
        self.env.obs_shape()
    }

    fn n_actions(&self) -> usize {
        self.env.n_actions()
    }
}
