//! Train [`Agent`].
mod config;
mod session;
use crate::{
    record::{Record, RecordValue, Recorder},
    Act, Agent, Env, Transition,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
use log::{info, warn};
pub use session::TrainingSession;
use std::path::Path;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs episodes of an agent on an environment.
///
/// # Training loop
///
/// For each of `n_episodes` episodes:
///
/// 1. Reset [`Env`] and the episode score.
/// 2. The agent chooses an action for the current observation with
///    [`Policy::sample`](crate::Policy::sample).
/// 3. Step the environment and add the reward to the score.
/// 4. Unless in evaluation-only mode, hand the transition
///    `(o_t, a_t, r_t, o_t+1, done)` to the agent with
///    [`Agent::store_transition`] and call [`Agent::learn`].
/// 5. `o_t <- o_t+1`; back to 2 until the episode ends.
/// 6. Record the score, the cumulative step count and the exploration rate
///    in [`TrainingSession`], log the progress, write a [`Record`] to the
///    recorder and, if the moving average of scores improved, save the
///    agent's parameters in `(model_dir)/best`.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|T[Trainer]
///     T -->|Transition|A
///     T -->|Record|R[Recorder]
/// ```
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self { config }
    }

    fn save_best_model<E: Env, A: Agent<E>>(agent: &A, model_dir: &str) {
        let path = Path::new(model_dir).join("best");
        match agent.save_params(&path) {
            Ok(()) => info!("Saved the model in {:?}.", &path),
            Err(e) => warn!("Failed to save model in {:?}: {}", &path, e),
        }
    }

    /// Runs one episode and returns the score with the mean loss of the
    /// learning steps done in it.
    fn run_episode<E, A>(
        &self,
        env: &mut E,
        agent: &mut A,
        session: &mut TrainingSession,
    ) -> Result<(f32, Option<f32>)>
    where
        E: Env,
        A: Agent<E>,
    {
        let mut obs = env.reset()?;
        let mut score = 0f32;
        let mut loss_sum = 0f32;
        let mut n_learns = 0usize;

        loop {
            let act = agent.sample(&obs)?;
            let step = env.step(&act)?;
            let (reward, is_done) = (step.reward, step.is_done);
            let next_obs = step.obs;
            score += reward;

            if !self.config.eval_only {
                agent.store_transition(Transition {
                    obs,
                    act: act.index(),
                    reward,
                    next_obs: next_obs.clone(),
                    is_done,
                })?;
                if let Some(record) = agent.learn()? {
                    if let Ok(loss) = record.get_scalar("loss") {
                        loss_sum += loss;
                        n_learns += 1;
                    }
                }
            }

            obs = next_obs;
            session.n_steps += 1;

            if is_done {
                break;
            }
        }

        let loss = (n_learns > 0).then(|| loss_sum / n_learns as f32);
        Ok((score, loss))
    }

    /// Runs the configured number of episodes.
    ///
    /// Any error from the environment or the agent stops the loop and is
    /// returned as is.
    pub fn train<E, A>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut dyn Recorder,
    ) -> Result<TrainingSession>
    where
        E: Env,
        A: Agent<E>,
    {
        let mut session = TrainingSession::new(self.config.avg_window);
        match self.config.eval_only {
            true => agent.eval(),
            false => agent.train(),
        }

        for episode in 0..self.config.n_episodes {
            let (score, loss) = self.run_episode(env, agent, &mut session)?;
            let epsilon = agent.epsilon();
            session.end_episode(score, epsilon);
            let avg_score = session.avg_score();

            if (episode + 1) % self.config.log_interval.max(1) == 0 {
                info!(
                    "episode {} score {:.1} average score {:.1} best score {:.1} epsilon {:.2} steps {}",
                    episode, score, avg_score, session.best_score, epsilon, session.n_steps
                );
            }

            let mut record = Record::from_slice(&[
                ("episode", RecordValue::Scalar(episode as f32)),
                ("steps", RecordValue::Scalar(session.n_steps as f32)),
                ("score", RecordValue::Scalar(score)),
                ("avg_score", RecordValue::Scalar(avg_score)),
                ("epsilon", RecordValue::Scalar(epsilon)),
                ("datetime", RecordValue::DateTime(Local::now())),
            ]);
            if let Some(loss) = loss {
                record.insert("loss", RecordValue::Scalar(loss));
            }

            let improved = session.update_best(avg_score);
            record.insert("best_score", RecordValue::Scalar(session.best_score));
            recorder.write(record)?;

            if improved && !self.config.eval_only {
                if let Some(model_dir) = &self.config.model_dir {
                    Self::save_best_model::<E, A>(agent, model_dir);
                }
            }
        }

        recorder.flush()?;
        Ok(session)
    }
}
