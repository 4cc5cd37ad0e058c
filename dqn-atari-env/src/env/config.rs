//! Configuration of the observation pipeline.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`make_env`](super::make_env).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PipelineConfig {
    /// The number of frames an action is repeated for.
    pub repeat: usize,

    /// If `true`, each per-frame reward is clipped to `[-1, 1]` before summation.
    pub clip_reward: bool,

    /// `(height, width)` of processed frames.
    pub frame_shape: (usize, usize),

    /// The number of stacked frames.
    pub stack_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            repeat: 4,
            clip_reward: false,
            frame_shape: (84, 84),
            stack_size: 4,
        }
    }
}

impl PipelineConfig {
    /// Sets the number of frames an action is repeated for.
    pub fn repeat(mut self, v: usize) -> Self {
        self.repeat = v;
        self
    }

    /// Sets per-frame reward clipping.
    pub fn clip_reward(mut self, v: bool) -> Self {
        self.clip_reward = v;
        self
    }

    /// Sets the shape of processed frames.
    pub fn frame_shape(mut self, height: usize, width: usize) -> Self {
        self.frame_shape = (height, width);
        self
    }

    /// Sets the number of stacked frames.
    pub fn stack_size(mut self, v: usize) -> Self {
        self.stack_size = v;
        self
    }

    /// Loads [`PipelineConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let rdr = BufReader::new(File::open(path)?);
        let config = serde_yaml::from_reader(rdr)?;
        info!("Load pipeline config from {}", path_.display());
        Ok(config)
    }

    /// Saves [`PipelineConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.repeat, 4);
        assert_eq!(config.frame_shape, (84, 84));
        assert_eq!(config.stack_size, 4);
        assert!(!config.clip_reward);
    }

    #[test]
    fn test_yaml() -> Result<()> {
        let config: PipelineConfig = serde_yaml::from_str(
            "repeat: 2\nclip_reward: true\nframe_shape: [42, 42]\nstack_size: 3\n",
        )?;
        assert_eq!(
            config,
            PipelineConfig::default()
                .repeat(2)
                .clip_reward(true)
                .frame_shape(42, 42)
                .stack_size(3)
        );
        Ok(())
    }
}
