//! Masked observations.
use anyhow::Result;
use metaschool_core::{BoxEnv, ConfigError, Env, Space, Step, TaskConfig, WrapperFactory};
use rand::{Rng, RngCore};
use std::fmt::Debug;

/// Sets one component of flat observations to zero.
pub struct ObsMask<E> {
    env: E,
    index: usize,
}

impl<E: Env<Obs = Vec<f32>>> ObsMask<E> {
    /// Wraps `env`, masking the component at `index`.
    pub fn new(env: E, index: usize) -> Self {
        Self { env, index }
    }

    fn mask(&self, mut obs: Vec<f32>) -> Vec<f32> {
        if let Some(v) = obs.get_mut(self.index) {
            *v = 0.0;
        }
        obs
    }
}

impl<E: Env<Obs = Vec<f32>>> Env for ObsMask<E> {
    type Obs = Vec<f32>;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Vec<f32>> {
        let obs = self.env.reset()?;
        Ok(self.mask(obs))
    }

    fn step(&mut self, a: &Self::Act) -> Step<Vec<f32>> {
        let mut step = self.env.step(a);
        step.obs = self.mask(std::mem::take(&mut step.obs));
        step
    }

    fn observation_space(&self) -> Space {
        self.env.observation_space()
    }

    fn action_space(&self) -> Space {
        self.env.action_space()
    }
}

/// Samples the masked `index` among the observation components of the
/// wrapped environment.
///
/// Sampling needs the environment; without one it fails with
/// [`ConfigError::EnvRequired`].
#[derive(Debug, Clone, Default)]
pub struct ObsMaskFactory;

impl<A> WrapperFactory<BoxEnv<Vec<f32>, A>> for ObsMaskFactory
where
    A: Clone + Debug + 'static,
{
    fn sample(
        &self,
        env: Option<&BoxEnv<Vec<f32>, A>>,
        rng: &mut dyn RngCore,
    ) -> Result<TaskConfig> {
        let env = env.ok_or(ConfigError::EnvRequired("ObsMaskFactory"))?;
        let dim = env.observation_space().flat_dim();
        if dim == 0 {
            return Err(ConfigError::InvalidValue {
                key: "index".to_string(),
                reason: "observations have no component".to_string(),
            }
            .into());
        }
        Ok(TaskConfig::new().with("index", rng.gen_range(0..dim)))
    }

    fn wrap(&self, env: BoxEnv<Vec<f32>, A>, config: &TaskConfig) -> Result<BoxEnv<Vec<f32>, A>> {
        let index = config.get_usize("index")?;
        let dim = env.observation_space().flat_dim();
        if index >= dim {
            return Err(ConfigError::InvalidValue {
                key: "index".to_string(),
                reason: format!("index {} out of {} observation components", index, dim),
            }
            .into());
        }
        Ok(Box::new(ObsMask::new(env, index)))
    }

    fn name(&self) -> &str {
        "ObsMaskFactory"
    }
}
