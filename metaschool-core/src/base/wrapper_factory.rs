//! Wrapper factories and their chaining.
use crate::{
    error::{BuildPhase, Stage, TasksetError},
    TaskConfig,
};
use anyhow::Result;
use log::debug;
use rand::RngCore;
use std::sync::Arc;

/// Defines how a wrapper is applied around an environment, and how its
/// configuration is sampled.
///
/// Some axes of variation across tasks are more easily implemented as
/// wrappers, e.g. the horizon of an episode or the scale of rewards.
/// Factories for such wrappers can be reused across base environments.
pub trait WrapperFactory<E>: Send + Sync {
    /// Samples the configuration of one application of this wrapper.
    ///
    /// `env` is the environment about to be wrapped, if available, so that
    /// sampling can depend on e.g. its observation space. With `None`, the
    /// factory returns an environment-independent sample, or fails with
    /// [`ConfigError::EnvRequired`] when it cannot.
    ///
    /// [`ConfigError::EnvRequired`]: crate::ConfigError::EnvRequired
    fn sample(&self, env: Option<&E>, rng: &mut dyn RngCore) -> Result<TaskConfig>;

    /// Wraps `env` according to `config`.
    ///
    /// Deterministic given `(env, config)`. The wrapped environment takes
    /// ownership of `env`.
    fn wrap(&self, env: E, config: &TaskConfig) -> Result<E>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// An ordered list of [`WrapperFactory`] applied as a single unit.
///
/// ```rust,ignore
/// let chain = WrapperChain::new(vec![Arc::new(TimeLimitFactory::default())]);
/// let env = chain.wrap(env_factory.make(&config)?, &[TaskConfig::new().with("max_steps", 10)])?;
/// ```
pub struct WrapperChain<E> {
    factories: Vec<Arc<dyn WrapperFactory<E>>>,
}

impl<E> Clone for WrapperChain<E> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<E> Default for WrapperChain<E> {
    fn default() -> Self {
        Self {
            factories: Vec::new(),
        }
    }
}

impl<E> WrapperChain<E> {
    /// Creates a chain applying `factories` in the given order.
    pub fn new(factories: Vec<Arc<dyn WrapperFactory<E>>>) -> Self {
        Self { factories }
    }

    /// Appends a factory at the end of the chain.
    pub fn push(&mut self, factory: Arc<dyn WrapperFactory<E>>) {
        self.factories.push(factory);
    }

    /// Number of wrapper factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Iterates over the factories in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn WrapperFactory<E>>> {
        self.factories.iter()
    }

    /// Samples a config for every wrapper and applies it, in order.
    ///
    /// Each factory samples with the environment built so far. Returns the
    /// wrapped environment and the sampled configs.
    pub fn sample_and_wrap(
        &self,
        mut env: E,
        rng: &mut dyn RngCore,
    ) -> Result<(E, Vec<TaskConfig>), TasksetError> {
        let mut configs = Vec::with_capacity(self.factories.len());
        for (i, factory) in self.factories.iter().enumerate() {
            let config =
                factory
                    .sample(Some(&env), rng)
                    .map_err(|source| TasksetError::TaskBuild {
                        stage: Stage::Wrapper(i),
                        phase: BuildPhase::Sample,
                        source,
                    })?;
            env = factory
                .wrap(env, &config)
                .map_err(|source| TasksetError::TaskBuild {
                    stage: Stage::Wrapper(i),
                    phase: BuildPhase::Wrap,
                    source,
                })?;
            debug!("Wrapped with {} {}", factory.name(), config);
            configs.push(config);
        }
        Ok((env, configs))
    }

    /// Applies every wrapper with the given configs, in order.
    ///
    /// `configs[i]` is used for the `i`-th factory; the lengths must match.
    pub fn wrap(&self, mut env: E, configs: &[TaskConfig]) -> Result<E, TasksetError> {
        if configs.len() != self.factories.len() {
            return Err(TasksetError::ShapeMismatch {
                expected: self.factories.len(),
                found: configs.len(),
            });
        }
        for (i, (factory, config)) in self.factories.iter().zip(configs).enumerate() {
            env = factory
                .wrap(env, config)
                .map_err(|source| TasksetError::ReplayFailed {
                    stage: Stage::Wrapper(i),
                    source,
                })?;
        }
        Ok(env)
    }
}

impl<E> From<Vec<Arc<dyn WrapperFactory<E>>>> for WrapperChain<E> {
    fn from(factories: Vec<Arc<dyn WrapperFactory<E>>>) -> Self {
        Self::new(factories)
    }
}
