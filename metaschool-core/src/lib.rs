#![warn(missing_docs)]
//! Sampling, tracking and replay of tasks built from simulated environments.
//!
//! A task is a base environment plus a chain of wrappers, each built from a
//! [`TaskConfig`]. An [`EnvFactory`] samples and builds base environments,
//! [`WrapperFactory`]s sample and apply wrappers, and a [`GymTaskset`] composes
//! them, records the configs of every task it samples as a [`TaskRecord`], and
//! rebuilds identical environments from those records.
pub mod error;
pub mod record;

mod base;
pub use base::{BoxEnv, Env, EnvFactory, Space, Step, WrapperChain, WrapperFactory};

mod config;
pub use config::{ConfigValue, TaskConfig};

pub use error::{BuildPhase, ConfigError, RecordError, Stage, TasksetError};

mod taskset;
pub use taskset::{GymTaskset, GymTasksetConfig, TaskEnvIter, TaskIter, TaskRecord};
