//! Stages of the observation pipeline.
mod action_repeat;
mod config;
mod frame_stack;
mod preprocess;
use crate::RawFrame;
pub use action_repeat::ActionRepeater;
use anyhow::Result;
pub use config::PipelineConfig;
use dqn_core::Env;
pub use frame_stack::{FrameStacker, StackFrames};
use log::info;
pub use preprocess::{FramePreprocessor, PreprocessFrame};

/// Base environment wrapped with action repeat, preprocessing and frame stacking.
pub type AtariPipeline<E> = StackFrames<PreprocessFrame<ActionRepeater<E>>>;

/// Composes the pipeline around a base environment emitting raw frames.
///
/// The returned environment emits [`StackedFrames`](crate::StackedFrames) of
/// shape `(stack_size, frame_shape.0, frame_shape.1)`.
pub fn make_env<E>(env: E, config: &PipelineConfig) -> Result<AtariPipeline<E>>
where
    E: Env<Obs = RawFrame>,
{
    let env = ActionRepeater::new(env, config.repeat, config.clip_reward)?;
    let preprocessor = FramePreprocessor::new(config.frame_shape.0, config.frame_shape.1)?;
    let env = PreprocessFrame::new(env, preprocessor);
    let env = StackFrames::new(env, config.stack_size)?;
    info!(
        "Built pipeline: repeat {}, clip_reward {}, frame {:?}, stack {}",
        config.repeat, config.clip_reward, config.frame_shape, config.stack_size
    );

    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{util::test::ScriptedEnv, AtariAct};
    use dqn_core::Obs;

    #[test]
    fn test_make_env() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let base = ScriptedEnv::solid(210, 160, &[0, 60, 120, 180], 6)
            .rewards(vec![1.0, 0.0, 2.0])
            .n_actions(6);
        let mut env = make_env(base, &PipelineConfig::default())?;

        assert_eq!(env.obs_shape(), vec![4, 84, 84]);
        assert_eq!(env.n_actions(), 6);

        let obs = env.reset()?;
        assert_eq!(obs.shape(), vec![4, 84, 84]);
        assert!(obs.0.iter().all(|&v| v == 0.0));

        let step = env.step(&AtariAct::new(1))?;
        assert_eq!(step.obs.shape(), vec![4, 84, 84]);
        // Sub-step rewards 1 + 0 + 2 + 1.
        assert_eq!(step.reward, 4.0);
        assert!(!step.is_done);

        // Two more sub-steps end the episode of 6 raw steps.
        let step = env.step(&AtariAct::new(1))?;
        assert!(step.is_done);
        assert_eq!(env.inner().inner().inner().n_steps(), 6);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let base = || ScriptedEnv::solid(10, 10, &[0], 1);
        assert!(make_env(base(), &PipelineConfig::default().repeat(0)).is_err());
        assert!(make_env(base(), &PipelineConfig::default().stack_size(0)).is_err());
        assert!(make_env(base(), &PipelineConfig::default().frame_shape(0, 84)).is_err());
    }
}
