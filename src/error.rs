/*
 * Error Module
 *
 * Failures the flock can report to its host. Numeric degeneracies (two agents
 * on the same point, zero-length steering) are recovered inside the kernel and
 * never show up here.
 */

/// Errors reported by the simulation driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlockError {
    /// A configuration value or per-tick input was out of range.
    #[error("invalid {field}: {reason}")]
    Configuration {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// `tick` was called before `initialize`.
    #[error("simulation has not been initialized")]
    NotInitialized,

    /// The driver was used after `shutdown`.
    #[error("simulation has been shut down")]
    ShutDown,

    /// `initialize` was called on a live simulation.
    #[error("simulation is already initialized")]
    AlreadyInitialized,

    /// A previous tick never completed.
    #[error("a previous tick is still marked in flight")]
    TickInFlight,
}

impl FlockError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        FlockError::Configuration {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlockError>;
