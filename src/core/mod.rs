//! Core graph types of a state machine.
//!
//! This module contains the pieces a machine is assembled from:
//! - Callbacks wrapping host operations or inline closures
//! - Conditions (guards) with their failure messages
//! - States, events and the transitions between them
//!
//! Everything here is immutable once a machine is built.

mod callback;
mod guard;
pub(crate) mod registry;
mod state;
mod transition;

pub use callback::Callback;
pub use guard::Condition;
pub use state::{Event, State, StateId};
pub use transition::Transition;
