//! Observation pipeline for training agents on Atari games from pixels.
//!
//! The pipeline wraps a base environment emitting raw RGB frames with three
//! stages, each of which implements [`dqn_core::Env`] and owns its inner stage:
//!
//! 1. [`ActionRepeater`] repeats an action for several frames, sums (and
//!    optionally clips) the rewards and max-pools the last two frames.
//! 2. [`PreprocessFrame`] converts each frame to grayscale, resizes it with
//!    area averaging and scales pixel values into `[0, 1]`
//!    (see [`FramePreprocessor`]).
//! 3. [`StackFrames`] keeps the most recent frames and emits them stacked
//!    along the first axis (see [`FrameStacker`]).
//!
//! [`make_env`] composes the three stages from a [`PipelineConfig`].
//!
//! With feature `ale`, [`AtariEnv`] provides a base environment on the Arcade
//! Learning Environment. ROM images are loaded from the directory given by the
//! environment variable `ATARI_ROM_DIR`. An easy way to install them is the
//! [AutoROM](https://pypi.org/project/AutoROM/) Python package.
//!
//! ```bash
//! pip install autorom
//! mkdir $HOME/atari_rom
//! AutoROM --install-dir $HOME/atari_rom
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! ```
mod act;
mod env;
mod obs;
pub mod util;
pub use act::AtariAct;
pub use env::{
    make_env, ActionRepeater, AtariPipeline, FramePreprocessor, FrameStacker, PipelineConfig,
    PreprocessFrame, StackFrames,
};
pub use obs::{ProcessedFrame, RawFrame, StackedFrames};

#[cfg(feature = "ale")]
mod atari_env;
#[cfg(feature = "ale")]
pub use atari_env::{AleInfo, AtariEnv, AtariEnvConfig};
