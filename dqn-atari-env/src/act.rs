//! Action for Atari environments.
use dqn_core::Act;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Index into the action set of the game.
pub struct AtariAct {
    pub act: usize,
}

impl AtariAct {
    pub fn new(act: usize) -> Self {
        Self { act }
    }
}

impl Act for AtariAct {
    fn index(&self) -> usize {
        self.act
    }
}

impl From<usize> for AtariAct {
    fn from(act: usize) -> Self {
        Self { act }
    }
}
