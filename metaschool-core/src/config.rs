//! Task configurations.
mod task_config;
mod value;

pub use task_config::TaskConfig;
pub use value::ConfigValue;
