//! Optimizers of action-value networks.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of the optimizer.
///
/// Moment coefficients and the denominator term keep the defaults of the
/// underlying optimizers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,

        /// Weight decay.
        #[serde(default = "default_weight_decay")]
        weight_decay: f64,
    },
}

fn default_weight_decay() -> f64 {
    ParamsAdamW::default().weight_decay
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 1e-4 }
    }
}

impl OptimizerConfig {
    /// Constructs the optimizer of the given variables.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let opt = match *self {
            Self::Adam { lr } => {
                let params = ParamsAdam {
                    lr,
                    ..ParamsAdam::default()
                };
                Optimizer::Adam(Adam::new(vars, params)?)
            }
            Self::AdamW { lr, weight_decay } => {
                let params = ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                };
                Optimizer::AdamW(AdamW::new(vars, params)?)
            }
        };
        Ok(opt)
    }

    /// Overrides the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        match &mut self {
            Self::Adam { lr } | Self::AdamW { lr, .. } => *lr = v,
        }
        self
    }

    /// Learning rate.
    pub fn lr(&self) -> f64 {
        match *self {
            Self::Adam { lr } | Self::AdamW { lr, .. } => lr,
        }
    }
}

/// An optimizer built from [`OptimizerConfig`].
pub enum Optimizer {
    /// Adam.
    Adam(Adam),

    /// AdamW.
    AdamW(AdamW),
}

impl Optimizer {
    /// Computes gradients of `loss` and updates the variables.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss)?,
            Self::AdamW(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_learning_rate() -> Result<()> {
        assert_eq!(OptimizerConfig::default().lr(), 1e-4);
        let config = OptimizerConfig::default().learning_rate(1e-3);
        assert_eq!(config, OptimizerConfig::Adam { lr: 1e-3 });

        let config: OptimizerConfig = serde_yaml::from_str("AdamW:\n  lr: 0.01\n")?;
        assert_eq!(config.lr(), 0.01);
        assert_eq!(
            config.learning_rate(0.5),
            OptimizerConfig::AdamW {
                lr: 0.5,
                weight_decay: default_weight_decay()
            }
        );
        Ok(())
    }

    #[test]
    fn test_backward_step_descends() -> Result<()> {
        for config in [
            OptimizerConfig::Adam { lr: 0.1 },
            OptimizerConfig::AdamW {
                lr: 0.1,
                weight_decay: 0.0,
            },
        ] {
            let x = Var::ones(1, DType::F32, &Device::Cpu)?;
            let mut opt = config.build(vec![x.clone()])?;
            let loss = x.as_tensor().sqr()?.sum_all()?;
            opt.backward_step(&loss)?;
            let v = x.as_tensor().to_vec1::<f32>()?[0];
            assert!(v < 1.0);
        }
        Ok(())
    }
}
