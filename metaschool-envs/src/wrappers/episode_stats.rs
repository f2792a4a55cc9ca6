//! Episode statistics.
use anyhow::Result;
use metaschool_core::{
    record::RecordValue, BoxEnv, Env, Space, Step, TaskConfig, WrapperFactory,
};
use rand::RngCore;
use std::fmt::Debug;

/// Reports `episode_return` and `episode_length` in the info of the last
/// step of every episode.
pub struct EpisodeStatistics<E: Env> {
    env: E,
    episode_return: f32,
    episode_length: usize,
}

impl<E: Env> EpisodeStatistics<E> {
    /// Wraps `env`.
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode_return: 0.0,
            episode_length: 0,
        }
    }
}

impl<E: Env> Env for EpisodeStatistics<E> {
    type Obs = E::Obs;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        self.episode_return = 0.0;
        self.episode_length = 0;
        self.env.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Step<Self::Obs> {
        let mut step = self.env.step(a);
        self.episode_return += step.reward;
        self.episode_length += 1;
        if step.is_done() {
            step.info
                .insert("episode_return", RecordValue::Scalar(self.episode_return));
            step.info.insert(
                "episode_length",
                RecordValue::Scalar(self.episode_length as f32),
            );
        }
        step
    }

    fn observation_space(&self) -> Space {
        self.env.observation_space()
    }

    fn action_space(&self) -> Space {
        self.env.action_space()
    }
}

/// Applies [`EpisodeStatistics`]. It has no parameter, so its config is empty.
#[derive(Debug, Clone, Default)]
pub struct EpisodeStatisticsFactory;

impl<O, A> WrapperFactory<BoxEnv<O, A>> for EpisodeStatisticsFactory
where
    O: Clone + Debug + 'static,
    A: Clone + Debug + 'static,
{
    fn sample(&self, _env: Option<&BoxEnv<O, A>>, _rng: &mut dyn RngCore) -> Result<TaskConfig> {
        Ok(TaskConfig::new())
    }

    fn wrap(&self, env: BoxEnv<O, A>, _config: &TaskConfig) -> Result<BoxEnv<O, A>> {
        Ok(Box::new(EpisodeStatistics::new(env)))
    }

    fn name(&self) -> &str {
        "EpisodeStatisticsFactory"
    }
}
