//! State of a training run.

/// Score statistics of a training run, owned by the training loop.
#[derive(Debug, Clone)]
pub struct TrainingSession {
    /// Score of each finished episode.
    pub scores: Vec<f32>,

    /// Cumulative environment steps at the end of each episode.
    pub steps: Vec<usize>,

    /// Exploration rate at the end of each episode.
    pub eps_history: Vec<f32>,

    /// Total environment steps so far.
    pub n_steps: usize,

    /// Best moving average of scores so far.
    pub best_score: f32,

    avg_window: usize,
}

impl TrainingSession {
    /// Creates an empty session.
    pub fn new(avg_window: usize) -> Self {
        Self {
            scores: vec![],
            steps: vec![],
            eps_history: vec![],
            n_steps: 0,
            best_score: f32::NEG_INFINITY,
            avg_window: avg_window.max(1),
        }
    }

    /// The number of finished episodes.
    pub fn n_episodes(&self) -> usize {
        self.scores.len()
    }

    /// Records the end of an episode.
    pub fn end_episode(&mut self, score: f32, epsilon: f32) {
        self.scores.push(score);
        self.steps.push(self.n_steps);
        self.eps_history.push(epsilon);
    }

    /// Mean of the last `avg_window` scores, `0.0` before the first episode.
    pub fn avg_score(&self) -> f32 {
        let n = self.scores.len();
        if n == 0 {
            return 0.0;
        }
        let recent = &self.scores[n.saturating_sub(self.avg_window)..];
        recent.iter().sum::<f32>() / recent.len() as f32
    }

    /// Replaces the best score if `score` is better, returns `true` if so.
    pub fn update_best(&mut self, score: f32) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}
