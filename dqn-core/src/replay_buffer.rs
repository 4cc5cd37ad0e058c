//! Ring replay memory with uniform sampling.
mod base;
mod batch;
mod config;
mod obs_batch;
mod subbatch;
pub use base::ReplayMemory;
pub use batch::TransitionBatch;
pub use config::ReplayMemoryConfig;
pub use obs_batch::ObsBatch;
pub use subbatch::SubBatch;
