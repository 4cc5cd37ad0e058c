//! Exploration strategy of DQN.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer with linear decay per learning step.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Epsilon at the start of training.
    pub eps_start: f32,

    /// Lower bound of epsilon.
    pub eps_min: f32,

    /// Decrement of epsilon per learning step.
    pub eps_dec: f32,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_min: 0.1,
            eps_dec: 1e-5,
        }
    }
}

impl EpsilonGreedy {
    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f32) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the lower bound of epsilon.
    pub fn eps_min(mut self, v: f32) -> Self {
        self.eps_min = v;
        self
    }

    /// Set the decrement per learning step.
    pub fn eps_dec(mut self, v: f32) -> Self {
        self.eps_dec = v;
        self
    }

    /// Epsilon after one more learning step.
    pub fn decay(&self, eps: f32) -> f32 {
        (eps - self.eps_dec).max(self.eps_min)
    }

    /// With probability `eps`, returns a uniformly random action.
    ///
    /// `None` means the greedy action should be taken.
    pub fn explore(&self, eps: f32, n_actions: usize, rng: &mut impl Rng) -> Option<usize> {
        if rng.gen::<f32>() < eps {
            Some(rng.gen_range(0..n_actions))
        } else {
            None
        }
    }
}
