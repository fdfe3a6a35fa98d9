//! Guard conditions for controlling transitions.
//!
//! A condition is a boolean predicate over the host and the event
//! arguments, plus the message reported when it blocks a transition.

use super::callback::Target;
use crate::host::{Arity, Host, HostError};
use std::fmt;
use std::rc::Rc;

type PredicateFn<H> = Rc<dyn Fn(&H, &[<H as Host>::Arg]) -> bool>;

/// Predicate that determines whether a transition is eligible.
///
/// Conditions only borrow the host; they are evaluated during transition
/// selection, before anything is allowed to change.
///
/// # Example
///
/// ```rust
/// use warden::core::Condition;
/// use warden::host::{Host, StateSlots};
///
/// struct Door {
///     slots: StateSlots,
///     locked: bool,
/// }
///
/// impl Host for Door {
///     type Arg = ();
///     fn read_state(&self, attribute: &str) -> Option<String> {
///         self.slots.get(attribute).map(str::to_owned)
///     }
///     fn write_state(&mut self, attribute: &str, state: &str) {
///         self.slots.set(attribute, state);
///     }
/// }
///
/// let unlocked = Condition::new(|door: &Door| !door.locked)
///     .with_failure_message("the door is locked");
///
/// let door = Door { slots: StateSlots::new(), locked: true };
/// assert!(!unlocked.evaluate(&door, &[]).unwrap());
/// assert_eq!(unlocked.failure_message(), "the door is locked");
/// ```
pub struct Condition<H: Host> {
    target: Target<PredicateFn<H>>,
    arity: Option<Arity>,
    failure_message: Option<String>,
}

impl<H: Host> Condition<H> {
    /// Condition evaluating the host's named predicate.
    pub fn operation(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            arity: H::arity(&name),
            target: Target::Operation(name),
            failure_message: None,
        }
    }

    /// Inline predicate that ignores the event arguments.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&H) -> bool + 'static,
    {
        Self {
            target: Target::Inline(Rc::new(move |host: &H, _: &[H::Arg]| predicate(host))),
            arity: Some(Arity::Nullary),
            failure_message: None,
        }
    }

    /// Inline predicate receiving the event arguments.
    pub fn with_args<F>(predicate: F) -> Self
    where
        F: Fn(&H, &[H::Arg]) -> bool + 'static,
    {
        Self {
            target: Target::Inline(Rc::new(predicate)),
            arity: Some(Arity::Forward),
            failure_message: None,
        }
    }

    /// Set the message reported when this condition blocks a transition.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Message reported when this condition fails. Falls back to the
    /// predicate's identity.
    pub fn failure_message(&self) -> String {
        match &self.failure_message {
            Some(message) => message.clone(),
            None => self.target.to_string(),
        }
    }

    /// Name of an operation the host type does not declare, if this is one.
    pub fn unresolved_operation(&self) -> Option<&str> {
        match self.arity {
            Some(_) => None,
            None => self.target.operation_name(),
        }
    }

    /// Evaluate the predicate against the host.
    pub fn evaluate(&self, host: &H, args: &[H::Arg]) -> Result<bool, HostError> {
        let Some(arity) = self.arity else {
            return Err(HostError::UnknownOperation(self.target.to_string()));
        };
        let args = arity.forward(args);
        match &self.target {
            Target::Operation(name) => host.test(name, args),
            Target::Inline(predicate) => Ok(predicate(host, args)),
        }
    }
}

impl<H: Host> Clone for Condition<H> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            arity: self.arity,
            failure_message: self.failure_message.clone(),
        }
    }
}

impl<H: Host> fmt::Display for Condition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.target.fmt(f)
    }
}

impl<H: Host> fmt::Debug for Condition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("predicate", &self.target.to_string())
            .field("failure_message", &self.failure_message)
            .finish()
    }
}

impl<H: Host> From<&str> for Condition<H> {
    fn from(name: &str) -> Self {
        Self::operation(name)
    }
}

impl<H: Host> From<String> for Condition<H> {
    fn from(name: String) -> Self {
        Self::operation(name)
    }
}
