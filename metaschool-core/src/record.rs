//! Key-value records attached to environment steps.
//!
//! Wrappers and environments report per-step information through a [`Record`],
//! e.g. the statistics of a finished episode.
//!
//! ```rust
//! use metaschool_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode_return", RecordValue::Scalar(12.0));
//! record.insert("episode_length", RecordValue::Scalar(30.0));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), 12.0);
//! ```
mod base;

pub use base::{Record, RecordValue};
