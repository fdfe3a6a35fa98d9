//! States and events of a machine graph.

use super::callback::Callback;
use super::transition::Transition;
use crate::host::Host;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a state within one machine.
///
/// Transitions refer to states through this index, never by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named trigger, shared by every state that declares transitions on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    name: String,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A node of the machine graph.
///
/// Holds the optional enter/exit hooks and, per event name, the ordered
/// candidate transitions leaving this state.
pub struct State<H: Host> {
    id: StateId,
    name: String,
    pub(crate) enter: Option<Callback<H>>,
    pub(crate) exit: Option<Callback<H>>,
    transitions: BTreeMap<String, Vec<Transition<H>>>,
}

impl<H: Host> State<H> {
    pub(crate) fn new(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enter: None,
            exit: None,
            transitions: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enter(&self) -> Option<&Callback<H>> {
        self.enter.as_ref()
    }

    pub fn exit(&self) -> Option<&Callback<H>> {
        self.exit.as_ref()
    }

    /// Candidate transitions for `event`, in declaration order.
    ///
    /// `None` when the state declares nothing for the event; a declared list
    /// is never empty.
    pub fn transitions_on(&self, event: &str) -> Option<&[Transition<H>]> {
        self.transitions.get(event).map(Vec::as_slice)
    }

    /// Events this state declares transitions for.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.transitions.keys().map(String::as_str)
    }

    pub(crate) fn add_transition(&mut self, event: &str, transition: Transition<H>) {
        self.transitions
            .entry(event.to_string())
            .or_default()
            .push(transition);
    }
}

impl<H: Host> fmt::Display for State<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<H: Host> fmt::Debug for State<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("enter", &self.enter)
            .field("exit", &self.exit)
            .field("transitions", &self.transitions)
            .finish()
    }
}
