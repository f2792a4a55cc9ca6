//! The jumping task and its factory.
mod config;
mod env;
mod factory;
pub use config::JumpEnvConfig;
pub use env::{JumpEnv, ACT_JUMP, ACT_RUN};
pub use factory::{JumpFactory, JumpFactoryConfig};
