//! Errors in the library.
use std::fmt;
use thiserror::Error;

/// Errors raised while reading, producing or consuming a [`TaskConfig`].
///
/// Factories return these wrapped in [`anyhow::Error`]; callers can recover
/// them with `downcast_ref::<ConfigError>()`.
///
/// [`TaskConfig`]: crate::TaskConfig
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required key is absent.
    #[error("missing config key: {0}")]
    MissingKey(String),

    /// A key is present but holds a value of another shape.
    #[error("config key {key} is not of type {expected}")]
    TypeMismatch {
        /// The offending key.
        key: String,
        /// Name of the expected value type.
        expected: &'static str,
    },

    /// A key holds a value the consumer cannot accept.
    #[error("invalid value for config key {key}: {reason}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A wrapper factory cannot sample without the environment it wraps.
    #[error("{0} requires the environment to be wrapped in order to sample")]
    EnvRequired(&'static str),

    /// Conversion between a config and a typed struct failed.
    #[error("config (de)serialization failed: {0}")]
    Serde(String),
}

/// Errors raised when reading a step [`Record`](crate::record::Record).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Record key error.
    #[error("record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("record value type error: {key} is not {expected}")]
    RecordValueTypeError {
        /// The offending key.
        key: String,
        /// Name of the expected value type.
        expected: &'static str,
    },
}

/// A construction stage of a task pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The base environment factory.
    Base,

    /// The wrapper factory at the given position.
    Wrapper(usize),
}

impl Stage {
    /// Returns the stage index, `-1` for the base factory.
    pub fn index(&self) -> isize {
        match self {
            Stage::Base => -1,
            Stage::Wrapper(i) => *i as isize,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Base => write!(f, "base (-1)"),
            Stage::Wrapper(i) => write!(f, "wrapper {}", i),
        }
    }
}

/// The factory call that failed within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// `sample()` of an env or wrapper factory.
    Sample,

    /// `make()` of the env factory.
    Make,

    /// `wrap()` of a wrapper factory.
    Wrap,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPhase::Sample => write!(f, "sample"),
            BuildPhase::Make => write!(f, "make"),
            BuildPhase::Wrap => write!(f, "wrap"),
        }
    }
}

/// Errors surfaced by [`GymTaskset`](crate::GymTaskset).
#[derive(Error, Debug)]
pub enum TasksetError {
    /// A stage of `sample()` failed. History is left unchanged.
    #[error("failed to build task at stage {stage} during {phase}")]
    TaskBuild {
        /// The failing stage.
        stage: Stage,
        /// The failing call.
        phase: BuildPhase,
        /// The originating error.
        source: anyhow::Error,
    },

    /// A stage of `make_like()` failed.
    #[error("failed to replay task at stage {stage}")]
    ReplayFailed {
        /// The failing stage.
        stage: Stage,
        /// The originating error.
        source: anyhow::Error,
    },

    /// The number of wrapper configs differs from the number of wrapper factories.
    #[error("record has {found} wrapper configs, but {expected} wrapper factories are registered")]
    ShapeMismatch {
        /// Number of registered wrapper factories.
        expected: usize,
        /// Number of wrapper configs in the record.
        found: usize,
    },

    /// No task has been recorded at the given position.
    #[error("task index {index} out of range for history of length {len}")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// Length of the history.
        len: usize,
    },
}

impl TasksetError {
    /// Returns the failing stage, if the error originates from a factory call.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TasksetError::TaskBuild { stage, .. } | TasksetError::ReplayFailed { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    /// Returns the originating [`ConfigError`], if any.
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            TasksetError::TaskBuild { source, .. } | TasksetError::ReplayFailed { source, .. } => {
                source.downcast_ref::<ConfigError>()
            }
            _ => None,
        }
    }
}
