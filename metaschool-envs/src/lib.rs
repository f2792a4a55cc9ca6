#![warn(missing_docs)]
//! Environment and wrapper families for [`metaschool_core`].
//!
//! * [`jump`] - the jumping task, where tasks vary in floor height and
//!   obstacle position.
//! * [`wrappers`] - time limits, reward scaling, episode statistics and
//!   observation masking, each with a factory sampling its parameters.
//!
//! ```rust,no_run
//! use metaschool_core::{GymTaskset, GymTasksetConfig};
//! use metaschool_envs::{jump::JumpFactory, wrappers::TimeLimitFactory, BoxTask};
//! use std::sync::Arc;
//!
//! let taskset = GymTaskset::<BoxTask>::build(
//!     &GymTasksetConfig::default().seed(42),
//!     Arc::new(JumpFactory::default()),
//!     vec![Arc::new(TimeLimitFactory::new(20, 200))],
//! );
//! let (train_task, record) = taskset.sample().unwrap();
//! let test_task = taskset.make_like(&record).unwrap();
//! ```
pub mod jump;
pub mod wrappers;

/// Type-erased tasks with flat observations and discrete actions,
/// as built by [`jump::JumpFactory`].
pub type BoxTask = metaschool_core::BoxEnv<Vec<f32>, usize>;
