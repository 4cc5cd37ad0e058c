//! DQN agent implemented with candle.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::ValueFunction,
    util::{argmax, obs_batch_to_tensor, smooth_l1_loss, CriticLoss},
};
use anyhow::{Context, Result};
use candle_core::{shape::D, Device, Tensor};
use candle_nn::loss::mse;
use dqn_core::{
    record::{Record, RecordValue},
    Agent, Configurable, DqnError, Env, ExperienceBufferBase, ObsBatch, Policy, ReplayBufferBase,
    ReplayMemory, Transition, TransitionBatch,
};
use log::{debug, info};
use rand::{rngs::SmallRng, SeedableRng};
use std::{fs, marker::PhantomData, path::Path};

#[allow(clippy::upper_case_acronyms)]
/// DQN agent implemented with candle.
///
/// The agent owns its replay memory. Each call of [`Agent::learn`] samples
/// a batch, regresses the online network towards the one-step TD target
/// computed with the target network, and decays epsilon. The target network
/// is overwritten with the online network every `sync_interval` learning
/// steps, starting with the first one.
pub struct Dqn<E, Q>
where
    E: Env,
    Q: ValueFunction,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    memory: ReplayMemory<ObsBatch>,
    batch_size: usize,
    discount_factor: f64,
    sync_interval: usize,
    explorer: EpsilonGreedy,
    epsilon: f32,
    critic_loss: CriticLoss,
    n_actions: usize,
    learn_steps: usize,
    train: bool,
    device: Device,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, Q> Dqn<E, Q>
where
    E: Env,
    Q: ValueFunction,
{
    /// The number of learning steps performed so far.
    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }

    /// The replay memory.
    pub fn memory(&self) -> &ReplayMemory<ObsBatch> {
        &self.memory
    }

    /// The online network.
    pub fn qnet(&self) -> &DqnModel<Q> {
        &self.qnet
    }

    /// The target network.
    pub fn qnet_tgt(&self) -> &DqnModel<Q> {
        &self.qnet_tgt
    }

    fn current_epsilon(&self) -> f32 {
        match self.train {
            true => self.epsilon,
            false => self.explorer.eps_min,
        }
    }

    fn validate(config: &DqnConfig<Q::Config>) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(DqnError::InvalidConfig(msg).into()) };
        if config.batch_size == 0 {
            return invalid("batch_size must be positive".into());
        }
        if config.batch_size > config.memory_config.capacity {
            return invalid(format!(
                "batch_size {} exceeds the memory capacity {}",
                config.batch_size, config.memory_config.capacity
            ));
        }
        if config.sync_interval == 0 {
            return invalid("sync_interval must be positive".into());
        }
        if !(config.discount_factor > 0.0 && config.discount_factor < 1.0) {
            return invalid(format!(
                "discount_factor must be in (0, 1), got {}",
                config.discount_factor
            ));
        }
        let explorer = &config.explorer;
        if !(0.0..=1.0).contains(&explorer.eps_min)
            || !(explorer.eps_min..=1.0).contains(&explorer.eps_start)
            || explorer.eps_dec < 0.0
        {
            return invalid(format!("invalid epsilon schedule: {:?}", explorer));
        }
        match config.model_config.get_out_dim() {
            Some(n) if n > 0 => Ok(()),
            _ => invalid("the number of actions must be positive".into()),
        }
    }

    /// Returns `r + gamma * max_a' Q_target(s', a')`, with the bootstrap term
    /// exactly zero for transitions ending an episode.
    fn td_target(&self, next_obs: &Tensor, reward: &Tensor, is_done: &Tensor) -> Result<Tensor> {
        let q_next = self.qnet_tgt.forward(next_obs)?.max(D::Minus1)?;
        let q_next = is_done.where_cond(&q_next.zeros_like()?, &q_next)?;
        let tgt = reward.add(&(q_next * self.discount_factor)?)?;
        Ok(tgt.detach())
    }

    fn update_critic(&mut self, batch: TransitionBatch<ObsBatch>) -> Result<f32> {
        let (obs, act, next_obs, reward, is_done, _ixs) = batch.unpack();
        let n = reward.len();
        let obs = obs_batch_to_tensor(&obs, &self.device)?;
        let next_obs = obs_batch_to_tensor(&next_obs, &self.device)?;
        let act = {
            let act = act.iter().map(|&a| a as i64).collect::<Vec<_>>();
            Tensor::from_vec(act, (n, 1), &self.device)?
        };
        let reward = Tensor::from_vec(reward, n, &self.device)?;
        let is_done = {
            let is_done = is_done.iter().map(|&d| d as u8).collect::<Vec<_>>();
            Tensor::from_vec(is_done, n, &self.device)?
        };

        let pred = self
            .qnet
            .forward(&obs)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;
        let tgt = self.td_target(&next_obs, &reward, &is_done)?;

        let loss = match self.critic_loss {
            CriticLoss::Mse => mse(&pred, &tgt)?,
            CriticLoss::SmoothL1 => smooth_l1_loss(&pred, &tgt)?,
        };

        // Backprop
        self.qnet.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    fn greedy_action(&self, obs: ObsBatch) -> Result<usize> {
        let xs = obs_batch_to_tensor(&obs, &self.device)?;
        let q = self.qnet.forward(&xs)?.squeeze(0)?.to_vec1::<f32>()?;
        argmax(&q).context("empty action values")
    }
}

impl<E, Q> Configurable for Dqn<E, Q>
where
    E: Env,
    Q: ValueFunction,
{
    type Config = DqnConfig<Q::Config>;

    /// Constructs DQN agent.
    fn build(config: Self::Config) -> Result<Self> {
        Self::validate(&config)?;
        let device: Device = config
            .device
            .context("No device is given for DQN agent")?
            .try_into()?;
        let qnet = DqnModel::build(config.model_config.clone(), &device)?;
        let qnet_tgt = DqnModel::build(config.model_config, &device)?;
        let memory = ReplayMemory::build(&config.memory_config)?;
        info!(
            "Built DQN agent: {} actions, memory {}, batch {}, sync every {} steps",
            qnet.out_dim(),
            config.memory_config.capacity,
            config.batch_size,
            config.sync_interval
        );

        Ok(Dqn {
            n_actions: qnet.out_dim(),
            qnet,
            qnet_tgt,
            memory,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            sync_interval: config.sync_interval,
            epsilon: config.explorer.eps_start,
            explorer: config.explorer,
            critic_loss: config.critic_loss,
            learn_steps: 0,
            train: true,
            device,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E, Q> Policy<E> for Dqn<E, Q>
where
    E: Env,
    Q: ValueFunction,
    E::Obs: TryInto<ObsBatch, Error = anyhow::Error>,
{
    /// Epsilon-greedy action. In evaluation mode, epsilon is fixed at `eps_min`.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let eps = self.current_epsilon();
        let a = match self.explorer.explore(eps, self.n_actions, &mut self.rng) {
            Some(a) => a,
            None => self.greedy_action(obs.clone().try_into()?)?,
        };
        Ok(a.into())
    }
}

impl<E, Q> Agent<E> for Dqn<E, Q>
where
    E: Env,
    Q: ValueFunction,
    E::Obs: TryInto<ObsBatch, Error = anyhow::Error>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn store_transition(&mut self, tr: Transition<E::Obs>) -> Result<()> {
        self.memory.push(Transition {
            obs: tr.obs.try_into()?,
            act: tr.act,
            reward: tr.reward,
            next_obs: tr.next_obs.try_into()?,
            is_done: tr.is_done,
        })
    }

    fn learn(&mut self) -> Result<Option<Record>> {
        if self.memory.len() < self.batch_size {
            return Ok(None);
        }

        if self.learn_steps % self.sync_interval == 0 {
            self.qnet_tgt.copy_params_from(&self.qnet)?;
            debug!("Synced target network at learning step {}", self.learn_steps);
        }

        let batch = self.memory.batch(self.batch_size)?;
        let loss = self.update_critic(batch)?;
        self.epsilon = self.explorer.decay(self.epsilon);
        self.learn_steps += 1;

        Ok(Some(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("epsilon", RecordValue::Scalar(self.epsilon)),
            ("learn_steps", RecordValue::Scalar(self.learn_steps as f32)),
        ])))
    }

    /// The decayed epsilon in training mode, `eps_min` in evaluation mode.
    fn epsilon(&self) -> f32 {
        self.current_epsilon()
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.safetensors"))?;
        self.qnet_tgt.save(path.join("qnet_tgt.safetensors"))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.safetensors"))?;
        self.qnet_tgt.load(path.join("qnet_tgt.safetensors"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dqn::DqnModelConfig,
        mlp::{Mlp, MlpConfig},
        opt::OptimizerConfig,
        Device as DqnDevice,
    };
    use candle_nn::VarMap;
    use dqn_core::{Act, Obs, ReplayMemoryConfig, Step};
    use tempdir::TempDir;

    #[derive(Clone, Debug)]
    struct TestObs(Vec<f32>);

    impl Obs for TestObs {
        fn shape(&self) -> Vec<usize> {
            vec![self.0.len()]
        }
    }

    impl TryFrom<TestObs> for ObsBatch {
        type Error = anyhow::Error;

        fn try_from(obs: TestObs) -> Result<Self> {
            ObsBatch::from_sample(obs.shape(), obs.0)
        }
    }

    #[derive(Clone, Debug)]
    struct TestAct(usize);

    impl Act for TestAct {
        fn index(&self) -> usize {
            self.0
        }
    }

    impl From<usize> for TestAct {
        fn from(a: usize) -> Self {
            Self(a)
        }
    }

    struct TestEnv;

    impl Env for TestEnv {
        type Obs = TestObs;
        type Act = TestAct;
        type Info = ();

        fn reset(&mut self) -> Result<TestObs> {
            Ok(TestObs(vec![0.0; 2]))
        }

        fn step(&mut self, a: &TestAct) -> Result<Step<Self>> {
            Ok(Step::new(TestObs(vec![0.0; 2]), a.clone(), 0.0, true, ()))
        }

        fn obs_shape(&self) -> Vec<usize> {
            vec![2]
        }

        fn n_actions(&self) -> usize {
            3
        }
    }

    type TestDqn = Dqn<TestEnv, Mlp>;

    fn config() -> DqnConfig<MlpConfig> {
        DqnConfig::default()
            .model_config(
                DqnModelConfig::default()
                    .q_config(MlpConfig::new(2, vec![8], 3))
                    .opt_config(OptimizerConfig::Adam { lr: 1e-2 }),
            )
            .memory_config(ReplayMemoryConfig::default().capacity(10))
            .batch_size(4)
            .device(DqnDevice::Cpu)
    }

    fn transition(k: usize) -> Transition<TestObs> {
        let x = k as f32 / 10.0;
        Transition {
            obs: TestObs(vec![x, 1.0 - x]),
            act: k % 3,
            reward: (k % 2) as f32,
            next_obs: TestObs(vec![x + 0.1, 0.9 - x]),
            is_done: k % 4 == 3,
        }
    }

    fn params(varmap: &VarMap) -> Result<Vec<(String, Vec<f32>)>> {
        let data = varmap.data().lock().unwrap();
        let mut params = data
            .iter()
            .map(|(k, v)| -> Result<(String, Vec<f32>)> {
                Ok((k.clone(), v.as_tensor().flatten_all()?.to_vec1::<f32>()?))
            })
            .collect::<Result<Vec<_>>>()?;
        params.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(params)
    }

    #[test]
    fn test_td_target_of_terminal_transition() -> Result<()> {
        let agent = TestDqn::build(config())?;
        let device = Device::Cpu;
        let next_obs = Tensor::from_slice(&[0.3f32, 0.7, 0.2, 0.4], (2, 2), &device)?;
        let reward = Tensor::from_slice(&[5.0f32, 1.0], 2, &device)?;
        let is_done = Tensor::from_slice(&[1u8, 0], 2, &device)?;

        let tgt = agent.td_target(&next_obs, &reward, &is_done)?.to_vec1::<f32>()?;
        assert_eq!(tgt[0], 5.0);

        let q_next = agent
            .qnet_tgt()
            .forward(&next_obs)?
            .max(D::Minus1)?
            .to_vec1::<f32>()?;
        assert!((tgt[1] - (1.0 + 0.99 * q_next[1])).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_learn_without_enough_transitions() -> Result<()> {
        let mut agent = TestDqn::build(config())?;
        for k in 0..3 {
            agent.store_transition(transition(k))?;
        }
        let before = params(agent.qnet().varmap())?;

        assert!(agent.learn()?.is_none());
        assert_eq!(params(agent.qnet().varmap())?, before);
        assert_eq!(agent.epsilon(), 1.0);
        assert_eq!(agent.learn_steps(), 0);
        Ok(())
    }

    #[test]
    fn test_epsilon_schedule() -> Result<()> {
        let config = config().eps_start(1.0).eps_dec(0.1).eps_min(0.1);
        let mut agent = TestDqn::build(config)?;
        for k in 0..4 {
            agent.store_transition(transition(k))?;
        }

        let mut eps = agent.epsilon();
        for _ in 0..20 {
            let record = agent.learn()?.unwrap();
            assert!(agent.epsilon() <= eps);
            assert_eq!(record.get_scalar("epsilon")?, agent.epsilon());
            eps = agent.epsilon();
        }
        assert_eq!(agent.epsilon(), 0.1);
        assert_eq!(agent.learn_steps(), 20);
        Ok(())
    }

    #[test]
    fn test_target_sync() -> Result<()> {
        let mut agent = TestDqn::build(config().sync_interval(3))?;
        for k in 0..8 {
            agent.store_transition(transition(k))?;
        }

        // The first learning step syncs before updating the online network.
        let online = params(agent.qnet().varmap())?;
        agent.learn()?;
        assert_eq!(params(agent.qnet_tgt().varmap())?, online);
        assert_ne!(params(agent.qnet().varmap())?, online);

        // The target stays fixed between syncs.
        agent.learn()?;
        agent.learn()?;
        assert_eq!(params(agent.qnet_tgt().varmap())?, online);

        // The fourth step copies the online parameters after three updates.
        let online = params(agent.qnet().varmap())?;
        agent.learn()?;
        assert_eq!(params(agent.qnet_tgt().varmap())?, online);
        Ok(())
    }

    #[test]
    fn test_greedy_in_eval_mode() -> Result<()> {
        let mut agent = TestDqn::build(config().eps_start(1.0).eps_min(0.0))?;
        agent.eval();
        assert_eq!(agent.epsilon(), 0.0);
        let obs = TestObs(vec![0.5, -0.5]);
        let q = agent
            .qnet()
            .forward(&Tensor::from_slice(&obs.0, (1, 2), &Device::Cpu)?)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        let best = argmax(&q).unwrap();
        for _ in 0..10 {
            assert_eq!(agent.sample(&obs)?.index(), best);
        }

        // Fully random in training mode with epsilon 1.
        agent.train();
        for _ in 0..10 {
            assert!(agent.sample(&obs)?.index() < 3);
        }
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let mut agent = TestDqn::build(config())?;
        for k in 0..4 {
            agent.store_transition(transition(k))?;
        }
        agent.learn()?;
        agent.learn()?;

        let dir = TempDir::new("dqn")?;
        agent.save_params(dir.path())?;
        assert!(dir.path().join("qnet.safetensors").is_file());
        assert!(dir.path().join("qnet_tgt.safetensors").is_file());

        let mut agent_ = TestDqn::build(config())?;
        agent_.load_params(dir.path())?;
        assert_eq!(
            params(agent_.qnet().varmap())?,
            params(agent.qnet().varmap())?
        );
        assert_eq!(
            params(agent_.qnet_tgt().varmap())?,
            params(agent.qnet_tgt().varmap())?
        );
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        assert!(TestDqn::build(config().batch_size(0)).is_err());
        assert!(TestDqn::build(config().batch_size(11)).is_err());
        assert!(TestDqn::build(config().sync_interval(0)).is_err());
        assert!(TestDqn::build(config().discount_factor(1.5)).is_err());
        assert!(TestDqn::build(config().discount_factor(1.0)).is_err());
        assert!(TestDqn::build(config().discount_factor(0.0)).is_err());
        assert!(TestDqn::build(config().discount_factor(f64::NAN)).is_err());
        assert!(TestDqn::build(config().discount_factor(0.5)).is_ok());
        assert!(TestDqn::build(config().eps_start(0.05)).is_err());
        assert!(TestDqn::build(config().out_dim(0)).is_err());

        let mut no_device = config();
        no_device.device = None;
        assert!(TestDqn::build(no_device).is_err());
    }
}
