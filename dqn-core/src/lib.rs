#![warn(missing_docs)]
//! Core of a DQN training engine for pixel-based games.
//!
//! This crate defines the interfaces shared by the environment pipeline and the
//! learning agent ([`Env`], [`Policy`], [`Agent`]), a fixed-capacity ring replay
//! memory ([`ReplayMemory`]), metric records ([`record`]) and the episode-driven
//! training loop ([`Trainer`]).
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Configurable, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase,
    Step, Transition,
};
pub use error::DqnError;
pub use replay_buffer::{ObsBatch, ReplayMemory, ReplayMemoryConfig, SubBatch, TransitionBatch};

mod trainer;
pub use trainer::{Trainer, TrainerConfig, TrainingSession};
