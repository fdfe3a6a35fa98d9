//! Host binding: the contract between the engine and the objects it governs.
//!
//! The engine never knows how a host stores its current state or how its
//! named operations are implemented. Everything goes through the [`Host`]
//! trait, implemented once per host type.

mod error;
mod slots;

pub use error::HostError;
pub use slots::StateSlots;

use std::fmt::Debug;

/// Calling convention of a named operation or inline callback.
///
/// Resolved once when the callback is registered, then used on every call to
/// decide whether the event arguments are forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Takes no event arguments; any supplied arguments are dropped.
    Nullary,
    /// Receives every event argument, in order.
    Forward,
}

impl Arity {
    /// Select the arguments this convention receives.
    pub fn forward<'a, A>(self, args: &'a [A]) -> &'a [A] {
        match self {
            Self::Nullary => &[],
            Self::Forward => args,
        }
    }
}

/// A domain object governed by one or more state machines.
///
/// # Example
///
/// ```rust
/// use warden::host::{Arity, Host, HostError, StateSlots};
///
/// #[derive(Default)]
/// struct Lamp {
///     slots: StateSlots,
///     bulb_ok: bool,
/// }
///
/// impl Host for Lamp {
///     type Arg = ();
///
///     fn read_state(&self, attribute: &str) -> Option<String> {
///         self.slots.get(attribute).map(str::to_owned)
///     }
///
///     fn write_state(&mut self, attribute: &str, state: &str) {
///         self.slots.set(attribute, state);
///     }
///
///     fn arity(operation: &str) -> Option<Arity> {
///         match operation {
///             "bulb_ok" => Some(Arity::Nullary),
///             _ => None,
///         }
///     }
///
///     fn test(&self, operation: &str, _args: &[()]) -> Result<bool, HostError> {
///         match operation {
///             "bulb_ok" => Ok(self.bulb_ok),
///             other => Err(HostError::UnknownOperation(other.to_string())),
///         }
///     }
/// }
/// ```
pub trait Host: Sized {
    /// Positional argument type forwarded from an event to its callbacks.
    type Arg: Debug;

    /// Stored state value under `attribute`, or `None` if never set.
    fn read_state(&self, attribute: &str) -> Option<String>;

    /// Store `state` under `attribute`.
    fn write_state(&mut self, attribute: &str, state: &str);

    /// Calling convention of the named operation, or `None` if the host has
    /// no operation by that name.
    fn arity(_operation: &str) -> Option<Arity> {
        None
    }

    /// Run the named action.
    fn call(&mut self, operation: &str, _args: &[Self::Arg]) -> Result<(), HostError> {
        Err(HostError::UnknownOperation(operation.to_string()))
    }

    /// Evaluate the named predicate.
    fn test(&self, operation: &str, _args: &[Self::Arg]) -> Result<bool, HostError> {
        Err(HostError::UnknownOperation(operation.to_string()))
    }

    /// Persist the host after a successful transition. Hosts without
    /// persistence keep the default no-op.
    fn save(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    /// Run `body` atomically with persistence, if the host supports it.
    ///
    /// An `Err` returned by `body` is the signal to roll back.
    fn transaction<T, E>(&mut self, body: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        body(self)
    }

    /// Identity of this host in diagnostics.
    fn identity(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name(full: &str) -> &str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
