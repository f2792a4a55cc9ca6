//! Jumping task.
use super::JumpEnvConfig;
use anyhow::Result;
use log::trace;
use metaschool_core::{record::Record, ConfigError, Env, Space, Step};

const BLACK: f32 = 0.0;
const GRAY: f32 = 0.5;
const WHITE: f32 = 1.0;

/// Run forward.
pub const ACT_RUN: usize = 0;

/// Jump, if not already in the air.
pub const ACT_JUMP: usize = 1;

/// A bare-bones jumping task.
///
/// The agent runs right at a constant speed along the floor and has to jump
/// over an obstacle. An episode ends when the agent hits the obstacle
/// (reward `-1`), exits the screen on the right (reward `speed + 1`), or
/// exceeds the horizon. Every other step yields reward `speed`.
///
/// Observations are either the rendered screen, flattened row-major with
/// shape `[height, width]`, or a 10-element vector of the physical state
/// normalized by the screen size.
///
/// Reference: Tachet des Combes et al. 2018. "Learning Invariances for Policy
/// Generalization", ICLR 2018 Workshop Track.
#[derive(Debug, Clone)]
pub struct JumpEnv {
    config: JumpEnvConfig,
    max_screen_size: f32,

    // [x, y] of the lower left corner of the agent.
    agent_position: [i64; 2],
    // Mid-air flag and vertical direction.
    jumping: (bool, i64),
    steps: usize,
    base_observation: Vec<f32>,
}

impl JumpEnv {
    /// Builds the environment.
    ///
    /// Fails with [`ConfigError::InvalidValue`] if the obstacle cannot be
    /// jumped over, or the screen is empty.
    pub fn build(config: &JumpEnvConfig) -> Result<Self> {
        if config.jumping_height + 1 < config.agent_size.0 + config.obstacle_size.0 {
            return Err(ConfigError::InvalidValue {
                key: "jumping_height".to_string(),
                reason: "task unsolvable, increase jumping height".to_string(),
            }
            .into());
        }
        if config.screen_width == 0 || config.screen_height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "screen_width".to_string(),
                reason: "screen must not be empty".to_string(),
            }
            .into());
        }
        if config.agent_speed <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "agent_speed".to_string(),
                reason: format!("expected a positive speed, got {}", config.agent_speed),
            }
            .into());
        }

        let mut env = Self {
            config: config.clone(),
            max_screen_size: config.screen_width.max(config.screen_height) as f32,
            agent_position: [0, config.floor_height],
            jumping: (false, 0),
            steps: 0,
            base_observation: vec![],
        };
        env.reset()?;
        Ok(env)
    }

    /// The configuration of this environment.
    pub fn config(&self) -> &JumpEnvConfig {
        &self.config
    }

    /// Position of the agent, `[x, y]`.
    pub fn agent_position(&self) -> [i64; 2] {
        self.agent_position
    }

    /// The lowest and highest achievable returns.
    pub fn reward_range(&self) -> (f32, f32) {
        (
            -1.0,
            (self.config.screen_width as i64 + 2 - self.config.agent_size.0) as f32,
        )
    }

    /// Returns the optimal action given the current state of the world.
    pub fn optimal_action(&self) -> usize {
        let dist_to_obstacle = (self.config.obstacle_position - self.agent_position[0]).abs();
        let jump_margin = self.config.agent_size.0 + self.config.obstacle_size.1;
        (dist_to_obstacle <= jump_margin - 1) as usize
    }

    fn step_dynamics(&mut self, a: usize) {
        let c = &self.config;
        if !self.jumping.0 && a == ACT_JUMP {
            self.jumping = (true, 1);
        }

        self.agent_position[0] += c.agent_speed;

        if self.jumping.0 {
            if self.agent_position[1] > c.floor_height + c.jumping_height {
                self.jumping.1 = -1;
            }
            self.agent_position[1] += self.jumping.1 * c.agent_speed;
            if self.agent_position[1] == c.floor_height {
                self.jumping = (false, 0);
            }
        }
    }

    fn is_collision(&self) -> bool {
        let c = &self.config;
        let [x, y] = self.agent_position;
        c.obstacle_position + c.obstacle_size.0 > x
            && c.obstacle_position < x + c.agent_size.0
            && c.floor_height + c.obstacle_size.1 > y
            && c.floor_height < y + c.agent_size.1
    }

    fn fill(&self, frame: &mut [f32], x: (i64, i64), y: (i64, i64), color: f32) {
        let w = self.config.screen_width as i64;
        let h = self.config.screen_height as i64;
        for yy in y.0.max(0)..y.1.min(h) {
            for xx in x.0.max(0)..x.1.min(w) {
                frame[(yy * w + xx) as usize] = color;
            }
        }
    }

    fn base_observation(&self) -> Vec<f32> {
        let c = &self.config;
        if c.vision_observations {
            let w = c.screen_width as i64;
            let h = c.screen_height as i64;
            let mut frame = vec![BLACK; c.screen_width * c.screen_height];

            // Obstacle
            self.fill(
                &mut frame,
                (c.obstacle_position, c.obstacle_position + c.obstacle_size.0),
                (c.floor_height, c.floor_height + c.obstacle_size.1),
                GRAY,
            );

            // Screen outline
            self.fill(&mut frame, (0, 1), (0, h), WHITE);
            self.fill(&mut frame, (w - 1, w), (0, h), WHITE);
            self.fill(&mut frame, (0, w), (0, 1), WHITE);
            self.fill(&mut frame, (0, w), (h - 1, h), WHITE);

            // Floor
            self.fill(&mut frame, (0, w), (c.floor_height, c.floor_height + 1), WHITE);
            frame
        } else {
            let [x, y] = self.agent_position;
            [
                x,
                y,
                c.agent_size.0,
                c.agent_size.1,
                c.agent_speed,
                c.jumping_height,
                c.floor_height,
                c.obstacle_position,
                c.obstacle_size.0,
                c.obstacle_size.1,
            ]
            .iter()
            .map(|v| *v as f32 / self.max_screen_size)
            .collect()
        }
    }

    fn observation(&self) -> Vec<f32> {
        let mut obs = self.base_observation.clone();
        let [x, y] = self.agent_position;
        if self.config.vision_observations {
            let (w, h) = self.config.agent_size;
            self.fill(&mut obs, (x, x + w), (y, y + h), WHITE);
        } else {
            obs[0] = x as f32 / self.max_screen_size;
            obs[1] = y as f32 / self.max_screen_size;
        }
        obs
    }
}

impl Env for JumpEnv {
    type Obs = Vec<f32>;
    type Act = usize;

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.agent_position = [0, self.config.floor_height];
        self.jumping = (false, 0);
        self.steps = 0;
        self.base_observation = self.base_observation();
        Ok(self.observation())
    }

    fn step(&mut self, a: &usize) -> Step<Vec<f32>> {
        self.step_dynamics(*a);

        let timelimit = self.steps > self.config.max_episode_steps;
        let collision = self.is_collision();
        let exited = (self.config.screen_width as i64) < self.agent_position[0] + self.config.agent_size.0;

        let reward = if collision {
            -1.0
        } else if exited {
            self.config.agent_speed as f32 + 1.0
        } else {
            self.config.agent_speed as f32
        };

        let obs = self.observation();
        self.steps += 1;
        trace!(
            "step {} position {:?} reward {}",
            self.steps,
            self.agent_position,
            reward
        );

        let is_terminated = collision || exited;
        Step::new(
            obs,
            reward,
            is_terminated,
            timelimit && !is_terminated,
            Record::empty(),
        )
    }

    fn observation_space(&self) -> Space {
        let shape = if self.config.vision_observations {
            vec![self.config.screen_height, self.config.screen_width]
        } else {
            vec![10]
        };
        Space::Box {
            low: 0.0,
            high: 1.0,
            shape,
        }
    }

    fn action_space(&self) -> Space {
        Space::Discrete(2)
    }
}
