use super::MlpConfig;
use crate::model::ValueFunction;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use dqn_core::DqnError;

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let mut dims = vec![config.in_dim];
    dims.extend(config.units.iter().copied());
    dims.push(config.out_dim);
    let vs = vs.pp(prefix);

    let layers = dims
        .windows(2)
        .enumerate()
        .map(|(i, d)| linear(d[0], d[1], vs.pp(format!("ln{}", i))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(layers)
}

/// Multilayer perceptron with ReLU activation function.
///
/// Observations are flattened, so the input can have any shape
/// `[n, ...]` with `in_dim` elements per sample.
pub struct Mlp {
    device: Device,
    layers: Vec<Linear>,
}

impl ValueFunction for Mlp {
    type Config = MlpConfig;

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        if config.in_dim == 0 || config.out_dim == 0 || config.units.contains(&0) {
            return Err(DqnError::InvalidConfig(format!("invalid MLP: {:?}", config)).into());
        }
        let device = vs.device().clone();
        let layers = create_linear_layers("mlp", vs, &config)?;

        Ok(Self { device, layers })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut xs = xs.to_device(&self.device)?.flatten_from(1)?;
        let n_layers = self.layers.len();

        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i + 1 < n_layers {
                xs = xs.relu()?;
            }
        }

        Ok(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_forward() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb, MlpConfig::new(8, vec![16, 16], 3))?;
        assert_eq!(varmap.all_vars().len(), 6);

        let xs = Tensor::zeros((5, 2, 4), DType::F32, &Device::Cpu)?;
        assert_eq!(mlp.forward(&xs)?.dims(), &[5, 3]);
        Ok(())
    }
}
