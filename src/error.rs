//! Runtime errors raised while firing events.

use crate::builder::DefinitionError;
use crate::engine::ImpossibleEvent;
use crate::host::HostError;
use thiserror::Error;

/// Errors that can occur when firing events or reading host state.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("'{state}' is not a valid state for state machine '{machine}'")]
    UnknownState { machine: String, state: String },

    #[error("No state machine in {scope} declares the event '{event}'")]
    UnknownEvent { scope: String, event: String },

    #[error("{host} is in an unrecognized state ({state:?}) for state machine '{machine}'")]
    InvalidState {
        machine: String,
        host: String,
        state: String,
    },

    #[error(transparent)]
    ImpossibleEvent(#[from] ImpossibleEvent),

    #[error("State machine '{machine}' is already transitioning; '{event}' cannot be fired from inside a transition")]
    ReentrantFiring { machine: String, event: String },

    #[error("Callback failed: {0}")]
    Host(#[from] HostError),

    #[error("{host} could not be saved: {source}")]
    Persistence { host: String, source: HostError },
}

impl Error {
    /// Whether this is the recoverable "not allowed right now" outcome.
    pub fn is_impossible_event(&self) -> bool {
        matches!(self, Self::ImpossibleEvent(_))
    }
}
