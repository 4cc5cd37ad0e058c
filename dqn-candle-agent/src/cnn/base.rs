use super::CnnConfig;
use crate::model::ValueFunction;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};
use dqn_core::DqnError;

// (out_channels, kernel, stride) of the convolution layers.
const CONVS: [(usize, usize, usize); 3] = [(32, 8, 4), (64, 4, 2), (64, 3, 1)];

#[allow(clippy::upper_case_acronyms)]
/// Convolutional neural network, which has the same architecture of the DQN paper.
///
/// The input is a batch of stacked frames of shape `[n, n_stack, h, w]`
/// with values already scaled into `[0, 1]`.
pub struct Cnn {
    device: Device,
    seq: Sequential,
}

impl Cnn {
    fn stride(s: usize) -> Conv2dConfig {
        Conv2dConfig {
            stride: s,
            ..Default::default()
        }
    }

    /// Spatial shape after the convolution layers, `None` if the input is too small.
    pub fn conv_out_shape(frame_shape: (usize, usize)) -> Option<(usize, usize)> {
        let (mut h, mut w) = frame_shape;
        for (_, k, s) in CONVS {
            if h < k || w < k {
                return None;
            }
            h = (h - k) / s + 1;
            w = (w - k) / s + 1;
        }
        Some((h, w))
    }

    fn create_net(vb: &VarBuilder, config: &CnnConfig) -> Result<Sequential> {
        let (h, w) = Self::conv_out_shape(config.frame_shape).ok_or_else(|| {
            DqnError::InvalidConfig(format!(
                "frame shape {:?} is too small for the convolution layers",
                config.frame_shape
            ))
        })?;
        let (c1, c2, c3) = (CONVS[0], CONVS[1], CONVS[2]);
        let flatten_dim = c3.0 * h * w;

        let seq = seq()
            .add(conv2d(config.n_stack, c1.0, c1.1, Self::stride(c1.2), vb.pp("c1"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(c1.0, c2.0, c2.1, Self::stride(c2.2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(c2.0, c3.0, c3.1, Self::stride(c3.2), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1))
            .add(linear(flatten_dim, 512, vb.pp("l1"))?)
            .add_fn(|xs| xs.relu())
            .add(linear(512, config.out_dim, vb.pp("l2"))?);

        Ok(seq)
    }
}

impl ValueFunction for Cnn {
    type Config = CnnConfig;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        if config.n_stack == 0 || config.out_dim == 0 {
            return Err(DqnError::InvalidConfig(format!(
                "n_stack and out_dim must be positive, got {:?}",
                config
            ))
            .into());
        }
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, &config)?;

        Ok(Self { device, seq })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(self.seq.forward(&xs.to_device(&self.device)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_conv_out_shape() {
        // 64 * 7 * 7 = 3136 features for 84x84 frames.
        assert_eq!(Cnn::conv_out_shape((84, 84)), Some((7, 7)));
        assert_eq!(Cnn::conv_out_shape((36, 36)), Some((1, 1)));
        assert_eq!(Cnn::conv_out_shape((20, 84)), None);
    }

    #[test]
    fn test_forward() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let cnn = Cnn::build(vb, CnnConfig::new(4, (84, 84), 6))?;

        let xs = Tensor::zeros((2, 4, 84, 84), DType::F32, &Device::Cpu)?;
        assert_eq!(cnn.forward(&xs)?.dims(), &[2, 6]);
        Ok(())
    }

    #[test]
    fn test_too_small_frame() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        assert!(Cnn::build(vb, CnnConfig::new(4, (16, 16), 6)).is_err());
    }
}
