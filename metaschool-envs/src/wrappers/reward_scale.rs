//! Scaled rewards.
use anyhow::Result;
use metaschool_core::{BoxEnv, ConfigError, Env, Space, Step, TaskConfig, WrapperFactory};
use rand::{Rng, RngCore};
use std::fmt::Debug;

/// Multiplies every reward by a constant.
pub struct RewardScale<E: Env> {
    env: E,
    scale: f32,
}

impl<E: Env> RewardScale<E> {
    /// Wraps `env`.
    pub fn new(env: E, scale: f32) -> Self {
        Self { env, scale }
    }
}

impl<E: Env> Env for RewardScale<E> {
    type Obs = E::Obs;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        self.env.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Step<Self::Obs> {
        let mut step = self.env.step(a);
        step.reward *= self.scale;
        step
    }

    fn observation_space(&self) -> Space {
        self.env.observation_space()
    }

    fn action_space(&self) -> Space {
        self.env.action_space()
    }
}

/// Samples `scale` uniformly in `[low, high)`.
#[derive(Debug, Clone)]
pub struct RewardScaleFactory {
    low: f64,
    high: f64,
}

impl RewardScaleFactory {
    /// Creates the factory.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl<O, A> WrapperFactory<BoxEnv<O, A>> for RewardScaleFactory
where
    O: Clone + Debug + 'static,
    A: Clone + Debug + 'static,
{
    fn sample(&self, _env: Option<&BoxEnv<O, A>>, rng: &mut dyn RngCore) -> Result<TaskConfig> {
        // NaN bounds fail this check too.
        if !(self.low < self.high) {
            return Err(ConfigError::InvalidValue {
                key: "scale".to_string(),
                reason: format!("empty range [{}, {})", self.low, self.high),
            }
            .into());
        }
        Ok(TaskConfig::new().with("scale", rng.gen_range(self.low..self.high)))
    }

    fn wrap(&self, env: BoxEnv<O, A>, config: &TaskConfig) -> Result<BoxEnv<O, A>> {
        let scale = config.get_f64("scale")?;
        Ok(Box::new(RewardScale::new(env, scale as f32)))
    }

    fn name(&self) -> &str {
        "RewardScaleFactory"
    }
}
