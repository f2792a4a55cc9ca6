//! Configuration of [`JumpEnv`](super::JumpEnv).
use serde::{Deserialize, Serialize};

/// Configuration of [`JumpEnv`](super::JumpEnv).
///
/// Sizes are `(width, height)` pairs, in pixels. Fields missing from a
/// deserialized config take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpEnvConfig {
    /// Height of the floor.
    pub floor_height: i64,

    /// X-position of the obstacle.
    pub obstacle_position: i64,

    /// Dimensions of the obstacle.
    pub obstacle_size: (i64, i64),

    /// Observe the rendered screen instead of the physical state.
    pub vision_observations: bool,

    /// Width of the screen.
    pub screen_width: usize,

    /// Height of the screen.
    pub screen_height: usize,

    /// Height of the agent's jump.
    pub jumping_height: i64,

    /// Speed of the agent.
    pub agent_speed: i64,

    /// Dimensions of the agent.
    pub agent_size: (i64, i64),

    /// Horizon of an episode.
    pub max_episode_steps: usize,
}

impl Default for JumpEnvConfig {
    fn default() -> Self {
        Self {
            floor_height: 10,
            obstacle_position: 20,
            obstacle_size: (9, 10),
            vision_observations: true,
            screen_width: 84,
            screen_height: 84,
            jumping_height: 15,
            agent_speed: 1,
            agent_size: (5, 10),
            max_episode_steps: 600,
        }
    }
}

impl JumpEnvConfig {
    /// Sets the height of the floor.
    pub fn floor_height(mut self, v: i64) -> Self {
        self.floor_height = v;
        self
    }

    /// Sets the x-position of the obstacle.
    pub fn obstacle_position(mut self, v: i64) -> Self {
        self.obstacle_position = v;
        self
    }

    /// Sets the dimensions of the obstacle.
    pub fn obstacle_size(mut self, v: (i64, i64)) -> Self {
        self.obstacle_size = v;
        self
    }

    /// Sets the observation mode.
    pub fn vision_observations(mut self, v: bool) -> Self {
        self.vision_observations = v;
        self
    }

    /// Sets a square screen of the given size.
    pub fn screen_size(mut self, v: usize) -> Self {
        self.screen_width = v;
        self.screen_height = v;
        self
    }

    /// Sets the height of the agent's jump.
    pub fn jumping_height(mut self, v: i64) -> Self {
        self.jumping_height = v;
        self
    }

    /// Sets the speed of the agent.
    pub fn agent_speed(mut self, v: i64) -> Self {
        self.agent_speed = v;
        self
    }

    /// Sets the dimensions of the agent.
    pub fn agent_size(mut self, v: (i64, i64)) -> Self {
        self.agent_size = v;
        self
    }

    /// Sets the horizon of an episode.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }
}
