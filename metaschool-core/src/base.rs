//! Core functionalities.
mod env;
mod env_factory;
mod space;
mod step;
mod wrapper_factory;
pub use env::{BoxEnv, Env};
pub use env_factory::EnvFactory;
pub use space::Space;
pub use step::Step;
pub use wrapper_factory::{WrapperChain, WrapperFactory};
