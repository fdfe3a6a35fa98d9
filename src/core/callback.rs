//! Uniform wrapper around behavior attached to a host.

use crate::host::{Arity, Host, HostError};
use std::fmt;
use std::rc::Rc;

/// Inline action closure, already adapted to receive the forwarded arguments.
pub(crate) type ActionFn<H> = Rc<dyn Fn(&mut H, &[<H as Host>::Arg])>;

/// What a callback runs: a host operation looked up by name, or a closure.
pub(crate) enum Target<F> {
    Operation(String),
    Inline(F),
}

impl<F: Clone> Clone for Target<F> {
    fn clone(&self) -> Self {
        match self {
            Self::Operation(name) => Self::Operation(name.clone()),
            Self::Inline(f) => Self::Inline(f.clone()),
        }
    }
}

impl<F> Target<F> {
    pub(crate) fn operation_name(&self) -> Option<&str> {
        match self {
            Self::Operation(name) => Some(name),
            Self::Inline(_) => None,
        }
    }
}

impl<F> fmt::Display for Target<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(name) => f.write_str(name),
            Self::Inline(_) => f.write_str("<inline>"),
        }
    }
}

/// A piece of behavior run against a host: an action, an enter/exit hook.
///
/// The calling convention is fixed when the callback is created. Named
/// operations ask the host type for their [`Arity`]; inline closures get it
/// from the constructor used.
///
/// # Example
///
/// ```rust
/// use warden::core::Callback;
/// use warden::host::{Host, StateSlots};
///
/// #[derive(Default)]
/// struct Counter {
///     slots: StateSlots,
///     hits: usize,
/// }
///
/// impl Host for Counter {
///     type Arg = usize;
///     fn read_state(&self, attribute: &str) -> Option<String> {
///         self.slots.get(attribute).map(str::to_owned)
///     }
///     fn write_state(&mut self, attribute: &str, state: &str) {
///         self.slots.set(attribute, state);
///     }
/// }
///
/// let bump = Callback::new(|c: &mut Counter| c.hits += 1);
/// let add = Callback::with_args(|c: &mut Counter, args: &[usize]| c.hits += args.iter().sum::<usize>());
///
/// let mut counter = Counter::default();
/// bump.call(&mut counter, &[10]).unwrap();
/// add.call(&mut counter, &[2, 3]).unwrap();
/// assert_eq!(counter.hits, 6);
/// ```
pub struct Callback<H: Host> {
    pub(crate) target: Target<ActionFn<H>>,
    arity: Option<Arity>,
}

impl<H: Host> Callback<H> {
    /// Callback running the host's named operation.
    pub fn operation(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            arity: H::arity(&name),
            target: Target::Operation(name),
        }
    }

    /// Inline callback that ignores the event arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut H) + 'static,
    {
        Self {
            target: Target::Inline(Rc::new(move |host: &mut H, _: &[H::Arg]| f(host))),
            arity: Some(Arity::Nullary),
        }
    }

    /// Inline callback receiving the event arguments.
    pub fn with_args<F>(f: F) -> Self
    where
        F: Fn(&mut H, &[H::Arg]) + 'static,
    {
        Self {
            target: Target::Inline(Rc::new(f)),
            arity: Some(Arity::Forward),
        }
    }

    /// Calling convention, or `None` for an operation the host does not declare.
    pub fn arity(&self) -> Option<Arity> {
        self.arity
    }

    /// Name of an operation the host type does not declare, if this is one.
    pub fn unresolved_operation(&self) -> Option<&str> {
        match self.arity {
            Some(_) => None,
            None => self.target.operation_name(),
        }
    }

    /// Run the callback, forwarding `args` according to its convention.
    pub fn call(&self, host: &mut H, args: &[H::Arg]) -> Result<(), HostError> {
        let Some(arity) = self.arity else {
            return Err(HostError::UnknownOperation(self.target.to_string()));
        };
        let args = arity.forward(args);
        match &self.target {
            Target::Operation(name) => host.call(name, args),
            Target::Inline(f) => {
                f(host, args);
                Ok(())
            }
        }
    }
}

impl<H: Host> Clone for Callback<H> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            arity: self.arity,
        }
    }
}

impl<H: Host> fmt::Display for Callback<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.target.fmt(f)
    }
}

impl<H: Host> fmt::Debug for Callback<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("target", &self.target.to_string())
            .field("arity", &self.arity)
            .finish()
    }
}

impl<H: Host> From<&str> for Callback<H> {
    fn from(name: &str) -> Self {
        Self::operation(name)
    }
}

impl<H: Host> From<String> for Callback<H> {
    fn from(name: String) -> Self {
        Self::operation(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StateSlots;

    #[derive(Default)]
    struct Recorder {
        slots: StateSlots,
        seen: Vec<Vec<i32>>,
    }

    impl Host for Recorder {
        type Arg = i32;

        fn read_state(&self, attribute: &str) -> Option<String> {
            self.slots.get(attribute).map(str::to_owned)
        }

        fn write_state(&mut self, attribute: &str, state: &str) {
            self.slots.set(attribute, state);
        }

        fn arity(operation: &str) -> Option<Arity> {
            match operation {
                "record" => Some(Arity::Forward),
                "record_nothing" => Some(Arity::Nullary),
                _ => None,
            }
        }

        fn call(&mut self, operation: &str, args: &[i32]) -> Result<(), HostError> {
            match operation {
                "record" | "record_nothing" => {
                    self.seen.push(args.to_vec());
                    Ok(())
                }
                other => Err(HostError::UnknownOperation(other.to_string())),
            }
        }
    }

    #[test]
    fn named_operation_receives_all_arguments() {
        let mut host = Recorder::default();
        Callback::<Recorder>::operation("record")
            .call(&mut host, &[1, 2])
            .unwrap();

        assert_eq!(host.seen, vec![vec![1, 2]]);
    }

    #[test]
    fn nullary_operation_receives_no_arguments() {
        let mut host = Recorder::default();
        let callback: Callback<Recorder> = "record_nothing".into();
        callback.call(&mut host, &[1, 2]).unwrap();

        assert_eq!(host.seen, vec![Vec::<i32>::new()]);
    }

    #[test]
    fn undeclared_operation_is_unresolved() {
        let callback = Callback::<Recorder>::operation("dance");
        assert_eq!(callback.arity(), None);
        assert_eq!(callback.unresolved_operation(), Some("dance"));

        let mut host = Recorder::default();
        assert_eq!(
            callback.call(&mut host, &[]),
            Err(HostError::UnknownOperation("dance".to_string()))
        );
    }

    #[test]
    fn inline_callbacks_adapt_to_their_convention() {
        let mut host = Recorder::default();

        Callback::new(|r: &mut Recorder| r.seen.push(vec![0]))
            .call(&mut host, &[9, 9])
            .unwrap();
        Callback::with_args(|r: &mut Recorder, args: &[i32]| r.seen.push(args.to_vec()))
            .call(&mut host, &[4, 5])
            .unwrap();

        assert_eq!(host.seen, vec![vec![0], vec![4, 5]]);
    }

    #[test]
    fn display_renders_identity() {
        assert_eq!(Callback::<Recorder>::operation("record").to_string(), "record");
        assert_eq!(
            Callback::new(|_: &mut Recorder| {}).to_string(),
            "<inline>"
        );
    }
}
