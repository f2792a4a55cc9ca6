//! Episodes of bounded length.
use anyhow::Result;
use log::trace;
use metaschool_core::{BoxEnv, ConfigError, Env, Space, Step, TaskConfig, WrapperFactory};
use rand::{Rng, RngCore};
use std::fmt::Debug;

/// Truncates episodes after `max_steps` steps.
pub struct TimeLimit<E: Env> {
    env: E,
    max_steps: usize,
    elapsed: usize,
}

impl<E: Env> TimeLimit<E> {
    /// Wraps `env`.
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            elapsed: 0,
        }
    }

    /// Steps taken in the current episode.
    pub fn elapsed(&self) -> usize {
        self.elapsed
    }
}

impl<E: Env> Env for TimeLimit<E> {
    type Obs = E::Obs;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        self.elapsed = 0;
        self.env.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Step<Self::Obs> {
        let mut step = self.env.step(a);
        self.elapsed += 1;
        if self.elapsed >= self.max_steps && !step.is_terminated {
            trace!("Truncated after {} steps", self.elapsed);
            step.is_truncated = true;
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

/// Samples the horizon `max_steps` uniformly in `[min_steps, max_steps]`.
///
/// Sampling does not depend on the wrapped environment.
#[derive(Debug, Clone)]
pub struct TimeLimitFactory {
    min_steps: usize,
    max_steps: usize,
}

impl Default for TimeLimitFactory {
    fn default() -> Self {
        Self::new(20, 200)
    }
}

impl TimeLimitFactory {
    /// Creates the factory.
    pub fn new(min_steps: usize, max_steps: usize) -> Self {
        Self {
            min_steps,
            max_steps,
        }
    }
}

impl<O, A> WrapperFactory<BoxEnv<O, A>> for TimeLimitFactory
where
    O: Clone + Debug + 'static,
    A: Clone + Debug + 'static,
{
    fn sample(&self, _env: Option<&BoxEnv<O, A>>, rng: &mut dyn RngCore) -> Result<TaskConfig> {
        if self.min_steps == 0 || self.min_steps > self.max_steps {
            return Err(ConfigError::InvalidValue {
                key: "max_steps".to_string(),
                reason: format!("empty range [{}, {}]", self.min_steps, self.max_steps),
            }
            .into());
        }
        let max_steps = rng.gen_range(self.min_steps..=self.max_steps);
        Ok(TaskConfig::new().with("max_steps", max_steps))
    }

    fn wrap(&self, env: BoxEnv<O, A>, config: &TaskConfig) -> Result<BoxEnv<O, A>> {
        let max_steps = config.get_usize("max_steps")?;
        if max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_steps".to_string(),
                reason: "horizon must be positive".to_string(),
            }
            .into());
        }
        Ok(Box::new(TimeLimit::new(env, max_steps)))
    }

    fn name(&self) -> &str {
        "TimeLimitFactory"
    }
}
