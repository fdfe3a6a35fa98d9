//! Firing engine.
//!
//! A [`StateMachine`] selects and executes transitions for one host;
//! [`Machines`] forwards an event to every machine of a host type that
//! declares it and combines their verdicts.

mod machine;
mod machines;
mod result;
pub(crate) mod store;

pub use machine::{StateMachine, Traversal};
pub(crate) use machine::{EventHook, TransitionHook};
pub use machines::{Machines, Outcome, Trigger};
pub use result::{FiringResult, ImpossibleEvent, Transitioned};

/// Key of the machine defined without a name.
pub const DEFAULT_MACHINE: &str = "statemachine";
