//! Error types for the engine.
//!
//! Two families:
//! - [`ConfigError`]: loading or validating an [`EngineConfig`](crate::config::EngineConfig)
//! - [`EngineError`]: scheduler-fatal failures raised during a tick
//!
//! Malformed commands are not errors: a move with nothing selected, or an
//! add for a duplicate id, is filtered out before any mutation happens.

use std::path::PathBuf;

use thiserror::Error;

/// Failure loading or validating engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration was not valid JSON for [`EngineConfig`](crate::config::EngineConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field held a value outside its allowed range.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Failure that stops the scheduler.
///
/// Any `EngineError` surfacing from [`Runner::step`](crate::runner::Runner::step)
/// triggers the shutdown sequence: the queue is cleared, a single `Quit` is
/// dispatched, and the loop exits.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A command consumer failed to apply a command.
    #[error("consumer `{consumer}` failed: {reason}")]
    Consumer {
        /// Name of the failing consumer.
        consumer: String,
        /// Failure description.
        reason: String,
    },

    /// The render collaborator failed.
    #[error("render failed: {0}")]
    Render(String),

    /// A unit's location or heading became NaN or infinite.
    #[error("unit `{unit}` reached a non-finite state")]
    NonFiniteState {
        /// Id of the affected unit.
        unit: String,
    },

    /// The scheduler thread could not be started.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The scheduler thread panicked.
    #[error("scheduler thread panicked")]
    SchedulerPanicked,
}

impl EngineError {
    /// Convenience constructor for consumer failures.
    #[must_use]
    pub fn consumer(consumer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Consumer {
            consumer: consumer.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = EngineError::consumer("network", "socket closed");
        assert_eq!(err.to_string(), "consumer `network` failed: socket closed");

        let err = EngineError::NonFiniteState { unit: "f-1".into() };
        assert!(err.to_string().contains("f-1"));
    }

    #[test]
    fn parse_errors_convert() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
