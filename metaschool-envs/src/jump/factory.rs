//! Factory of jumping tasks.
use super::{JumpEnv, JumpEnvConfig};
use crate::BoxTask;
use anyhow::Result;
use log::debug;
use metaschool_core::{ConfigError, EnvFactory, TaskConfig};
use rand::{seq::SliceRandom, RngCore};
use serde::{Deserialize, Serialize};

/// Configuration of [`JumpFactory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpFactoryConfig {
    /// Floor heights to sample from.
    pub possible_heights: Vec<i64>,

    /// Obstacle positions to sample from.
    pub possible_positions: Vec<i64>,

    /// Parameters shared by every task, overridden by the sampled ones.
    pub env_config: JumpEnvConfig,
}

impl Default for JumpFactoryConfig {
    fn default() -> Self {
        Self {
            possible_heights: (1..10).map(|i| i * 5).collect(),
            possible_positions: (3..10).map(|i| i * 5).collect(),
            env_config: JumpEnvConfig::default()
                .vision_observations(false)
                .screen_size(60),
        }
    }
}

impl JumpFactoryConfig {
    /// Sets the floor heights to sample from.
    pub fn possible_heights(mut self, v: Vec<i64>) -> Self {
        self.possible_heights = v;
        self
    }

    /// Sets the obstacle positions to sample from.
    pub fn possible_positions(mut self, v: Vec<i64>) -> Self {
        self.possible_positions = v;
        self
    }

    /// Sets the parameters shared by every task.
    pub fn env_config(mut self, v: JumpEnvConfig) -> Self {
        self.env_config = v;
        self
    }
}

/// Samples jumping tasks varying in floor height and obstacle position.
///
/// A sampled config holds `floor_height` and `obstacle_position`; any other
/// [`JumpEnvConfig`] field present in a config overrides the shared
/// parameters of the factory.
#[derive(Debug, Clone, Default)]
pub struct JumpFactory {
    config: JumpFactoryConfig,
}

impl JumpFactory {
    /// Builds the factory.
    pub fn build(config: JumpFactoryConfig) -> Self {
        Self { config }
    }

    /// Builds the jumping environment described by `config`, unboxed.
    pub fn make_env(&self, config: &TaskConfig) -> Result<JumpEnv> {
        for key in ["floor_height", "obstacle_position"] {
            if !config.contains_key(key) {
                return Err(ConfigError::MissingKey(key.to_string()).into());
            }
        }
        let env_config: JumpEnvConfig = TaskConfig::from_struct(&self.config.env_config)?
            .merge(config)
            .to_struct()?;
        debug!("Make jumping task {}", config);
        JumpEnv::build(&env_config)
    }
}

fn choose(candidates: &[i64], key: &str, rng: &mut dyn RngCore) -> Result<i64, ConfigError> {
    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "no candidate value to sample from".to_string(),
        })
}

impl EnvFactory<BoxTask> for JumpFactory {
    fn sample(&self, rng: &mut dyn RngCore) -> Result<TaskConfig> {
        let floor_height = choose(&self.config.possible_heights, "floor_height", rng)?;
        let obstacle_position = choose(&self.config.possible_positions, "obstacle_position", rng)?;
        Ok(TaskConfig::new()
            .with("floor_height", floor_height)
            .with("obstacle_position", obstacle_position))
    }

    fn make(&self, config: &TaskConfig) -> Result<BoxTask> {
        Ok(Box::new(self.make_env(config)?))
    }

    fn enumerate(&self) -> Option<Vec<TaskConfig>> {
        let mut configs = vec![];
        for height in self.config.possible_heights.iter() {
            for position in self.config.possible_positions.iter() {
                configs.push(
                    TaskConfig::new()
                        .with("floor_height", *height)
                        .with("obstacle_position", *position),
                );
            }
        }
        Some(configs)
    }
}
