//! Definition errors for machine builders.

use std::fmt;
use thiserror::Error;

/// State hook kinds, for duplicate-declaration diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Enter,
    Exit,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => f.write_str("enter"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Errors that can occur when defining state machines.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("No initial state defined for state machine '{machine}'. Call .initial_state(name) before .build()")]
    MissingInitialState { machine: String },

    #[error("State '{state}' declares its {hook} callback more than once")]
    DuplicateCallback { state: String, hook: Hook },

    #[error("A state machine named '{name}' is already defined. Give each state machine on a host type a unique name")]
    DuplicateMachine { name: String },

    #[error("Host has no operation named '{operation}'")]
    UnknownOperation { operation: String },

    #[error("Malformed machine definition: {0}")]
    Malformed(#[from] serde_json::Error),
}
