//! Builder API for defining state machines.
//!
//! Machines are described with nested, by-value builders: a
//! [`StateMachineBuilder`] takes state blocks, a [`StateBuilder`] takes event
//! blocks, and an [`EventBuilder`] takes transition blocks. The same
//! definitions can also be written as data with [`MachineDefinition`].

mod definition;
mod error;
mod machine;
mod state;
mod transition;

pub use definition::{
    EventDefinition, GuardDefinition, MachineDefinition, StateDefinition, TransitionDefinition,
};
pub use error::{DefinitionError, Hook};
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
pub use transition::{EventBuilder, TransitionBuilder, SELF_TARGET};
