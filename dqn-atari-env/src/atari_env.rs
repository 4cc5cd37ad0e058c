//! Base environment on the Arcade Learning Environment.
//!
//! If environment variable `ATARI_ROM_DIR` exists, it is used as the directory
//! from which ROM images of the Atari games are loaded.
mod ale;
use crate::{AtariAct, RawFrame};
use ale::{Ale, AleConfig};
use anyhow::Result;
use dqn_core::{Act, Configurable, DqnError, Env, Info, Step};
use log::info;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Configuration of [`AtariEnv`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AtariEnvConfig {
    /// Directory of ROM images.
    pub rom_dir: String,

    /// Name of the game, the ROM image is `{rom_dir}/{name}.bin`.
    pub name: String,

    /// Seed of the emulator.
    pub seed: i32,

    /// Probability of repeating the previous action (sticky actions).
    pub repeat_action_probability: f32,

    /// Opens a window showing the screen. Requires feature `sdl`.
    pub render: bool,
}

impl Default for AtariEnvConfig {
    fn default() -> Self {
        let rom_dir = match env::var("ATARI_ROM_DIR") {
            Ok(var) => var,
            Err(_) => dirs::home_dir()
                .map(|p| p.join("atari_rom").to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        Self {
            rom_dir,
            name: "pong".to_string(),
            seed: 42,
            repeat_action_probability: 0.0,
            render: false,
        }
    }
}

impl AtariEnvConfig {
    /// Sets the directory of ROM images.
    pub fn rom_dir(mut self, rom_dir: impl Into<String>) -> Self {
        self.rom_dir = rom_dir.into();
        self
    }

    /// Sets the name of the game.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seed of the emulator.
    pub fn seed(mut self, seed: i32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the probability of sticky actions.
    pub fn repeat_action_probability(mut self, p: f32) -> Self {
        self.repeat_action_probability = p;
        self
    }

    /// Sets the render flag.
    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    fn rom_path(&self) -> PathBuf {
        PathBuf::from(&self.rom_dir).join(format!("{}.bin", self.name))
    }
}

/// Information of a step of [`AtariEnv`].
#[derive(Debug, Clone)]
pub struct AleInfo {
    /// Remaining lives.
    pub lives: u32,
}

impl Info for AleInfo {}

/// An Atari game emitting raw RGB frames of shape `(210, 160, 3)`.
///
/// Actions index the minimal action set of the game. An episode ends when
/// the game is over.
pub struct AtariEnv {
    ale: Ale,
    actions: Vec<i32>,
}

impl AtariEnv {
    fn frame(&self) -> Result<RawFrame> {
        RawFrame::from_interleaved(self.ale.height(), self.ale.width(), 3, self.ale.rgb24())
    }
}

impl Configurable for AtariEnv {
    type Config = AtariEnvConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let rom_path = config.rom_path();
        let ale_config = AleConfig {
            random_seed: config.seed,
            display_screen: config.render,
            repeat_action_probability: config.repeat_action_probability,
        };
        let ale = Ale::new(&rom_path, ale_config)?;
        let actions = ale.minimal_actions();
        info!(
            "Loaded {} with {} actions from {}",
            config.name,
            actions.len(),
            rom_path.display()
        );

        Ok(Self { ale, actions })
    }
}

impl Env for AtariEnv {
    type Obs = RawFrame;
    type Act = AtariAct;
    type Info = AleInfo;

    fn reset(&mut self) -> Result<RawFrame> {
        self.ale.reset();
        self.frame()
    }

    fn step(&mut self, a: &AtariAct) -> Result<Step<Self>> {
        let code = *self.actions.get(a.index()).ok_or_else(|| {
            DqnError::EnvContract(format!(
                "action {} out of range of {} actions",
                a.index(),
                self.actions.len()
            ))
        })?;
        let reward = self.ale.take_action(code) as f32;
        let obs = self.frame()?;
        let is_done = self.ale.is_game_over();
        let info = AleInfo {
            lives: self.ale.lives(),
        };

        Ok(Step::new(obs, *a, reward, is_done, info))
    }

    fn obs_shape(&self) -> Vec<usize> {
        vec![self.ale.height(), self.ale.width(), 3]
    }

    fn n_actions(&self) -> usize {
        self.actions.len()
    }
}
