//! Trains a DQN agent on Atari Pong from pixels.
//!
//! [`DqnPongConfig`] aggregates the configurations of the observation
//! pipeline, the agent and the training loop, and is stored as a single YAML
//! file. [`run`] wires a base environment emitting raw frames into the
//! pipeline, builds the agent on [`Cnn`] and runs the training loop, writing
//! the learning curve as CSV into the model directory.
//!
//! The `dqn_pong` binary (feature `ale`) runs it on the Arcade Learning
//! Environment.
use anyhow::{Context, Result};
use dqn_atari_env::{make_env, AtariPipeline, PipelineConfig, RawFrame};
use dqn_candle_agent::{
    cnn::{Cnn, CnnConfig},
    dqn::{Dqn, DqnConfig, DqnModelConfig},
    Device,
};
use dqn_core::{
    record::{CsvRecorder, NullRecorder, Recorder},
    Agent, Configurable, Env, Trainer, TrainerConfig, TrainingSession,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::Path,
};

/// Columns of the learning curve.
pub const CURVE_COLUMNS: [&str; 8] = [
    "episode",
    "steps",
    "score",
    "avg_score",
    "best_score",
    "epsilon",
    "loss",
    "datetime",
];

/// File name of the configuration saved in the model directory.
pub const CONFIG_FILE: &str = "dqn_pong.yaml";

/// The agent trained on the pipeline around base environment `E`.
pub type PongAgent<E> = Dqn<AtariPipeline<E>, Cnn>;

/// Configuration of a training or evaluation run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnPongConfig {
    /// Observation pipeline.
    pub pipeline: PipelineConfig,

    /// DQN agent. The input shape and output dimension of the network are
    /// derived from the pipeline and the environment when the agent is built.
    pub agent: DqnConfig<CnnConfig>,

    /// Training loop.
    pub trainer: TrainerConfig,

    /// File name of the learning curve in the model directory.
    pub curve_file: String,
}

impl Default for DqnPongConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            agent: DqnConfig::default()
                .model_config(DqnModelConfig::default().q_config(CnnConfig::default()))
                .device(Device::Cpu),
            trainer: TrainerConfig::default(),
            curve_file: "learning_curve.csv".to_string(),
        }
    }
}

impl DqnPongConfig {
    /// Sets the pipeline configuration.
    pub fn pipeline(mut self, v: PipelineConfig) -> Self {
        self.pipeline = v;
        self
    }

    /// Sets the agent configuration.
    pub fn agent(mut self, v: DqnConfig<CnnConfig>) -> Self {
        self.agent = v;
        self
    }

    /// Sets the trainer configuration.
    pub fn trainer(mut self, v: TrainerConfig) -> Self {
        self.trainer = v;
        self
    }

    /// Sets the file name of the learning curve.
    pub fn curve_file(mut self, v: impl Into<String>) -> Self {
        self.curve_file = v.into();
        self
    }

    /// Agent configuration with the network matching the pipeline output
    /// and the given number of actions.
    pub fn agent_config(&self, n_actions: usize) -> DqnConfig<CnnConfig> {
        let q_config = CnnConfig::new(
            self.pipeline.stack_size,
            self.pipeline.frame_shape,
            n_actions,
        );
        self.agent.clone().q_config(q_config)
    }

    /// Loads [`DqnPongConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config from {}", path_.display());
        Ok(b)
    }

    /// Saves [`DqnPongConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config into {}", path_.display());
        Ok(())
    }
}

fn create_recorder(config: &DqnPongConfig) -> Result<Box<dyn Recorder>> {
    match &config.trainer.model_dir {
        Some(model_dir) => {
            fs::create_dir_all(model_dir)?;
            let path = Path::new(model_dir).join(&config.curve_file);
            Ok(Box::new(CsvRecorder::new(path, &CURVE_COLUMNS)?))
        }
        None => Ok(Box::new(NullRecorder {})),
    }
}

/// Builds the pipeline around `env` and the agent on it.
pub fn build<E>(env: E, config: &DqnPongConfig) -> Result<(AtariPipeline<E>, PongAgent<E>)>
where
    E: Env<Obs = RawFrame>,
{
    let env = make_env(env, &config.pipeline)?;
    let agent = PongAgent::<E>::build(config.agent_config(env.n_actions()))?;
    Ok((env, agent))
}

/// Trains the agent on `env`, or only evaluates it if
/// `config.trainer.eval_only` is set.
///
/// In training, the configuration is saved in the model directory and the
/// trainer keeps the best model in `(model_dir)/best`. In evaluation, the
/// parameters are loaded from there.
pub fn run<E>(env: E, config: &DqnPongConfig) -> Result<TrainingSession>
where
    E: Env<Obs = RawFrame>,
{
    let (mut env, mut agent) = build(env, config)?;

    if config.trainer.eval_only {
        let model_dir = config
            .trainer
            .model_dir
            .as_ref()
            .context("model_dir is required for evaluation")?;
        agent.load_params(&Path::new(model_dir).join("best"))?;
        agent.eval();
    } else if let Some(model_dir) = &config.trainer.model_dir {
        fs::create_dir_all(model_dir)?;
        config.save(Path::new(model_dir).join(CONFIG_FILE))?;
    }

    let mut recorder = create_recorder(config)?;
    let mut trainer = Trainer::build(config.trainer.clone());
    let session = trainer.train(&mut env, &mut agent, recorder.as_mut())?;
    info!(
        "Finished {} episodes, {} steps, best average score {:.1}",
        session.n_episodes(),
        session.n_steps,
        session.best_score
    );

    Ok(session)
}
