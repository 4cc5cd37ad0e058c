use anyhow::Result;
use clap::Parser;
use dqn_atari_env::{AtariEnv, AtariEnvConfig};
use dqn_candle_agent::Device;
use dqn_core::Configurable;
use dqn_pong::{run, DqnPongConfig, CONFIG_FILE};
use std::path::Path;

/// Train DQN agent on an Atari game
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the game, the ROM image is `$ATARI_ROM_DIR/{name}.bin`
    #[arg(long, default_value = "pong")]
    name: String,

    /// Directory of checkpoints, configuration and the learning curve
    #[arg(short, long, default_value = "./model/dqn_pong")]
    model_dir: String,

    /// Configuration file, `(model_dir)/dqn_pong.yaml` is used with --eval if omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Evaluate the best model in the model directory without training
    #[arg(long, default_value_t = false)]
    eval: bool,

    /// Use the first CUDA device
    #[arg(long, default_value_t = false)]
    cuda: bool,

    /// Print the configuration and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,

    /// Discount factor
    #[arg(long)]
    gamma: Option<f64>,

    /// Epsilon at the start of training
    #[arg(long)]
    eps_start: Option<f32>,

    /// Lower bound of epsilon
    #[arg(long)]
    eps_min: Option<f32>,

    /// Decrement of epsilon per learning step
    #[arg(long)]
    eps_dec: Option<f32>,

    /// Learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Capacity of the replay memory
    #[arg(long)]
    memory: Option<usize>,

    /// Batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Interval of target network synchronization in learning steps
    #[arg(long)]
    sync_interval: Option<usize>,

    /// The number of frames an action is repeated for
    #[arg(long)]
    repeat: Option<usize>,

    /// The number of stacked frames
    #[arg(long)]
    stack_size: Option<usize>,

    /// Side length of the square processed frames
    #[arg(long)]
    frame_size: Option<usize>,

    /// Clip per-frame rewards to [-1, 1]
    #[arg(long, default_value_t = false)]
    clip_reward: bool,

    /// The number of episodes
    #[arg(short = 'n', long)]
    episodes: Option<usize>,

    /// Seed of the emulator and the agent
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn base_config(&self) -> Result<DqnPongConfig> {
        let saved = Path::new(&self.model_dir).join(CONFIG_FILE);
        match &self.config {
            Some(path) => DqnPongConfig::load(path),
            None if self.eval && saved.exists() => DqnPongConfig::load(saved),
            None => Ok(DqnPongConfig::default()),
        }
    }

    /// Applies the command line overrides to the configuration.
    fn config(&self) -> Result<DqnPongConfig> {
        let config = self.base_config()?;
        let mut agent = config.agent.clone();
        let mut pipeline = config.pipeline.clone();
        let mut trainer = config.trainer.clone().model_dir(self.model_dir.as_str());

        if let Some(v) = self.gamma {
            agent = agent.discount_factor(v);
        }
        if let Some(v) = self.eps_start {
            agent = agent.eps_start(v);
        }
        if let Some(v) = self.eps_min {
            agent = agent.eps_min(v);
        }
        if let Some(v) = self.eps_dec {
            agent = agent.eps_dec(v);
        }
        if let Some(v) = self.lr {
            agent = agent.learning_rate(v);
        }
        if let Some(v) = self.memory {
            agent = agent.memory_capacity(v);
        }
        if let Some(v) = self.batch_size {
            agent = agent.batch_size(v);
        }
        if let Some(v) = self.sync_interval {
            agent = agent.sync_interval(v);
        }
        if let Some(v) = self.seed {
            agent = agent.seed(v);
        }
        if self.cuda {
            agent = agent.device(Device::Cuda(0));
        }
        if let Some(v) = self.repeat {
            pipeline = pipeline.repeat(v);
        }
        if let Some(v) = self.stack_size {
            pipeline = pipeline.stack_size(v);
        }
        if let Some(v) = self.frame_size {
            pipeline = pipeline.frame_shape(v, v);
        }
        if self.clip_reward {
            pipeline = pipeline.clip_reward(true);
        }
        if let Some(v) = self.episodes {
            trainer = trainer.n_episodes(v);
        }
        trainer = trainer.eval_only(self.eval);

        let config = config.agent(agent).pipeline(pipeline).trainer(trainer);
        Ok(match self.eval {
            true => config.curve_file("eval_curve.csv"),
            false => config,
        })
    }

    fn env_config(&self) -> AtariEnvConfig {
        let config = AtariEnvConfig::default().name(self.name.as_str());
        match self.seed {
            Some(seed) => config.seed(seed as i32),
            None => config,
        }
    }
}

fn show_config(env_config: &AtariEnvConfig, config: &DqnPongConfig) -> Result<()> {
    println!("{}", serde_yaml::to_string(env_config)?);
    println!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.config()?;
    let env_config = args.env_config();

    if args.show_config {
        return show_config(&env_config, &config);
    }

    let env = AtariEnv::build(env_config)?;
    let session = run(env, &config)?;
    if args.eval {
        let mean = session.scores.iter().sum::<f32>() / session.n_episodes().max(1) as f32;
        println!("Mean score over {} episodes: {:.1}", session.n_episodes(), mean);
    }

    Ok(())
}
