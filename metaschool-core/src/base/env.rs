//! Environment.
use super::{Space, Step};
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment, typically an MDP.
///
/// Every object produced by [`EnvFactory::make`] or [`WrapperFactory::wrap`]
/// is expected to satisfy this contract. The task machinery itself never calls
/// these methods; they are the interface a learner uses on a sampled task.
///
/// The trait is object safe, so pipelines of heterogeneous wrappers are
/// usually built over [`BoxEnv`].
///
/// [`EnvFactory::make`]: crate::EnvFactory::make
/// [`WrapperFactory::wrap`]: crate::WrapperFactory::wrap
pub trait Env {
    /// Observation of the environment.
    type Obs: Clone + Debug;

    /// Action of the environment.
    type Act: Clone + Debug;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Step<Self::Obs>;

    /// Descriptor of the observations.
    fn observation_space(&self) -> Space;

    /// Descriptor of the actions.
    fn action_space(&self) -> Space;
}

/// A type-erased environment.
pub type BoxEnv<O, A> = Box<dyn Env<Obs = O, Act = A>>;

impl<E: Env + ?Sized> Env for Box<E> {
    type Obs = E::Obs;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        (**self).reset()
    }

    fn step(&mut self, a: &Self::Act) -> Step<Self::Obs> {
        (**self).step(a)
    }

    fn observation_space(&self) -> Space {
        (**self).observation_space()
    }

    fn action_space(&self) -> Space {
        (**self).action_space()
    }
}
