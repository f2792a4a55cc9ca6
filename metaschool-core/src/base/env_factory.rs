//! Base environment factory.
use crate::TaskConfig;
use anyhow::Result;
use rand::RngCore;

/// Defines how a base environment is created, and how its configuration is sampled.
///
/// Task creation proceeds in two steps:
///
/// 1. Sampling of the random parameters of the task with [`EnvFactory::sample`].
/// 2. Instantiation of the task given chosen parameters with [`EnvFactory::make`].
///
/// A factory holds no per-call state; one instance can serve any number of
/// calls and be shared across tasksets.
///
/// ```rust
/// use anyhow::Result;
/// use metaschool_core::{EnvFactory, TaskConfig};
/// use rand::{Rng, RngCore};
///
/// struct Corridor {
///     speed: i64,
/// }
///
/// struct CorridorFactory;
///
/// impl EnvFactory<Corridor> for CorridorFactory {
///     fn sample(&self, rng: &mut dyn RngCore) -> Result<TaskConfig> {
///         Ok(TaskConfig::new().with("speed", rng.gen_range(1..=10)))
///     }
///
///     fn make(&self, config: &TaskConfig) -> Result<Corridor> {
///         Ok(Corridor { speed: config.get_i64("speed")? })
///     }
/// }
/// ```
pub trait EnvFactory<E>: Send + Sync {
    /// Samples the configuration of a new base environment.
    ///
    /// Randomness must come from `rng` only, so that a seeded source
    /// reproduces the same sequence of configurations.
    fn sample(&self, rng: &mut dyn RngCore) -> Result<TaskConfig>;

    /// Builds the environment described by `config`.
    ///
    /// This method must be deterministic: the same config yields behaviorally
    /// equivalent environments. It fails with [`ConfigError`] when `config`
    /// lacks a required parameter.
    ///
    /// [`ConfigError`]: crate::ConfigError
    fn make(&self, config: &TaskConfig) -> Result<E>;

    /// Lists every configuration the factory can sample, if the set is finite.
    fn enumerate(&self) -> Option<Vec<TaskConfig>> {
        None
    }
}
