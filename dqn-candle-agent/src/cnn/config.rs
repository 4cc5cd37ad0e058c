use crate::util::OutDim;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
pub struct CnnConfig {
    /// The number of stacked frames, the input channels.
    pub n_stack: usize,

    /// `(height, width)` of input frames.
    pub frame_shape: (usize, usize),

    /// The number of actions.
    pub out_dim: usize,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            n_stack: 4,
            frame_shape: (84, 84),
            out_dim: 6,
        }
    }
}

impl CnnConfig {
    /// Constructs [`CnnConfig`].
    pub fn new(n_stack: usize, frame_shape: (usize, usize), out_dim: usize) -> Self {
        Self {
            n_stack,
            frame_shape,
            out_dim,
        }
    }
}

impl OutDim for CnnConfig {
    fn get_out_dim(&self) -> usize {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: usize) {
        self.out_dim = v;
    }
}
