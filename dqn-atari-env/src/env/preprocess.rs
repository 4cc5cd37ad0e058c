use crate::{ProcessedFrame, RawFrame};
use anyhow::Result;
use dqn_core::{DqnError, Env, Step};
use image::{imageops, ImageBuffer, Luma, Rgb};
use ndarray::{Array2, Axis};

/// Converts raw frames to grayscale, resizes them and scales values into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct FramePreprocessor {
    height: usize,
    width: usize,
}

impl FramePreprocessor {
    /// Constructs a preprocessor emitting frames of shape `(1, height, width)`.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(DqnError::InvalidConfig(format!(
                "frame shape must be positive, got ({}, {})",
                height, width
            ))
            .into());
        }
        Ok(Self { height, width })
    }

    /// Shape of the output frames.
    pub fn shape(&self) -> Vec<usize> {
        vec![1, self.height, self.width]
    }

    /// Processes a frame of shape `(h, w, 1)` or `(h, w, 3)`.
    ///
    /// RGB frames are converted to grayscale with the luma weights of the
    /// `image` crate. Resizing averages source pixels over the area each
    /// output pixel covers.
    pub fn process(&self, frame: &RawFrame) -> Result<ProcessedFrame> {
        let (h, w, c) = frame.0.dim();
        if h == 0 || w == 0 {
            return Err(DqnError::EnvContract(format!(
                "empty frame of shape {:?}",
                frame.0.shape()
            ))
            .into());
        }

        let gray = match c {
            1 => frame.0.index_axis(Axis(2), 0).mapv(|v| v as f32),
            3 => Self::grayscale(frame, h, w)?,
            _ => {
                return Err(DqnError::EnvContract(format!(
                    "expected 1 or 3 channels, got {}",
                    c
                ))
                .into())
            }
        };

        let resized = resize_area(&gray, self.height, self.width);
        let scaled = resized.mapv(|v| v.round().clamp(0.0, 255.0) / 255.0);
        Ok(ProcessedFrame(scaled.insert_axis(Axis(0))))
    }

    fn grayscale(frame: &RawFrame, h: usize, w: usize) -> Result<Array2<f32>> {
        let data = frame.0.iter().copied().collect::<Vec<_>>();
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w as u32, h as u32, data)
            .ok_or_else(|| DqnError::EnvContract("failed to read the frame as RGB image".into()))?;
        let gray: ImageBuffer<Luma<u8>, Vec<u8>> = imageops::grayscale(&img);
        let gray = Array2::from_shape_vec((h, w), gray.into_raw())
            .map_err(|e| DqnError::EnvContract(e.to_string()))?;
        Ok(gray.mapv(|v| v as f32))
    }
}

/// Coverage of source cells by each destination cell along one axis.
///
/// Returns, per destination cell, the `(source index, weight)` pairs whose
/// weights sum to one.
fn area_weights(src: usize, dst: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = start + scale;
            let mut weights = vec![];
            let mut s = start.floor() as usize;
            while (s as f64) < end && s < src {
                let lo = start.max(s as f64);
                let hi = end.min((s + 1) as f64);
                if hi > lo {
                    weights.push((s, (hi - lo) / scale));
                }
                s += 1;
            }
            weights
        })
        .collect()
}

fn resize_area(src: &Array2<f32>, height: usize, width: usize) -> Array2<f32> {
    let (h, w) = src.dim();
    let wy = area_weights(h, height);
    let wx = area_weights(w, width);

    Array2::from_shape_fn((height, width), |(y, x)| {
        let mut acc = 0f64;
        for &(sy, ky) in wy[y].iter() {
            for &(sx, kx) in wx[x].iter() {
                acc += src[[sy, sx]] as f64 * ky * kx;
            }
        }
        acc as f32
    })
}

/// Applies a [`FramePreprocessor`] to every frame of the inner environment.
pub struct PreprocessFrame<E: Env<Obs = RawFrame>> {
    env: E,
    preprocessor: FramePreprocessor,
}

impl<E: Env<Obs = RawFrame>> PreprocessFrame<E> {
    /// Wraps `env`.
    pub fn new(env: E, preprocessor: FramePreprocessor) -> Self {
        Self { env, preprocessor }
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }
}

impl<E: Env<Obs = RawFrame>> Env for PreprocessFrame<E> {
    type Obs = ProcessedFrame;
    type Act = E::Act;
    type Info = E::Info;

    fn reset(&mut self) -> Result<ProcessedFrame> {
        let obs = self.env.reset()?;
        self.preprocessor.process(&obs)
    }

    fn step(&mut self, a: &E::Act) -> Result<Step<Self>> {
        let step = self.env.step(a)?;
        let obs = self.preprocessor.process(&step.obs)?;
        Ok(Step::new(obs, step.act, step.reward, step.is_done, step.info))
    }

    fn obs_shape(&self) -> Vec<usize> {
        self.preprocessor.shape()
    }

    fn n_actions(&self) -> usize {
        self.env.n_actions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_black_and_white() -> Result<()> {
        let p = FramePreprocessor::new(84, 84)?;

        let black = p.process(&RawFrame::zeros(210, 160, 3))?;
        assert_eq!(black.0.shape(), &[1, 84, 84]);
        assert!(black.0.iter().all(|&v| v == 0.0));

        let white = p.process(&RawFrame(Array3::from_elem((210, 160, 3), 255)))?;
        assert_eq!(white.0.shape(), &[1, 84, 84]);
        assert!(white.0.iter().all(|&v| v == 1.0));
        Ok(())
    }

    #[test]
    fn test_solid_gray_is_preserved() -> Result<()> {
        let p = FramePreprocessor::new(84, 84)?;
        let frame = p.process(&RawFrame(Array3::from_elem((210, 160, 3), 51)))?;
        assert!(frame.0.iter().all(|&v| v == 51.0 / 255.0));
        Ok(())
    }

    #[test]
    fn test_area_average() -> Result<()> {
        // 4x4 single-channel frame with 2x2 blocks of 0, 40, 80 and 120.
        let mut a = Array3::zeros((4, 4, 1));
        for y in 0..4 {
            for x in 0..4 {
                a[[y, x, 0]] = (40 * (2 * (y / 2) + x / 2)) as u8;
            }
        }
        // Top-left block averages to 6.
        a[[0, 0, 0]] = 24;

        let p = FramePreprocessor::new(2, 2)?;
        let frame = p.process(&RawFrame(a))?;
        let expected = [6.0f32, 40.0, 80.0, 120.0];
        for (v, e) in frame.0.iter().zip(expected.iter()) {
            assert_eq!(*v, e / 255.0);
        }
        Ok(())
    }

    #[test]
    fn test_area_weights_sum_to_one() {
        for &(src, dst) in &[(210, 84), (160, 84), (4, 2), (3, 5)] {
            for cells in area_weights(src, dst) {
                let sum: f64 = cells.iter().map(|(_, k)| k).sum();
                assert!((sum - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_invalid_frames() -> Result<()> {
        let p = FramePreprocessor::new(2, 2)?;
        assert!(p.process(&RawFrame::zeros(4, 4, 2)).is_err());
        assert!(p.process(&RawFrame::zeros(0, 4, 3)).is_err());
        assert!(FramePreprocessor::new(0, 2).is_err());
        Ok(())
    }
}
