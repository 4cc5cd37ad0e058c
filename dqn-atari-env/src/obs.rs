//! Observations at each stage of the pipeline.
use anyhow::{Error, Result};
use dqn_core::{DqnError, Obs, ObsBatch};
use ndarray::Array3;
use std::convert::TryFrom;

/// A raw frame of shape `(height, width, channels)` as rendered by the game.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame(pub Array3<u8>);

impl RawFrame {
    /// Creates a frame from interleaved pixel values in row-major order,
    /// e.g. the RGB24 screen buffer of an emulator.
    pub fn from_interleaved(height: usize, width: usize, channels: usize, buf: Vec<u8>) -> Result<Self> {
        let frame = Array3::from_shape_vec((height, width, channels), buf).map_err(|e| {
            DqnError::EnvContract(format!(
                "screen buffer does not match ({}, {}, {}): {}",
                height, width, channels, e
            ))
        })?;
        Ok(Self(frame))
    }

    /// A black frame of the given shape.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self(Array3::zeros((height, width, channels)))
    }
}

impl Obs for RawFrame {
    fn shape(&self) -> Vec<usize> {
        self.0.shape().to_vec()
    }
}

/// A grayscale frame of shape `(1, h, w)` with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame(pub Array3<f32>);

impl Obs for ProcessedFrame {
    fn shape(&self) -> Vec<usize> {
        self.0.shape().to_vec()
    }
}

/// The `K` most recent processed frames of shape `(K, h, w)`, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedFrames(pub Array3<f32>);

impl Obs for StackedFrames {
    fn shape(&self) -> Vec<usize> {
        self.0.shape().to_vec()
    }
}

impl TryFrom<StackedFrames> for ObsBatch {
    type Error = Error;

    fn try_from(obs: StackedFrames) -> Result<Self> {
        let shape = obs.shape();
        let data = obs.0.iter().copied().collect();
        ObsBatch::from_sample(shape, data)
    }
}
