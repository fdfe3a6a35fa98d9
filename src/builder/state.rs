//! Builder for the declarations made inside a state block.

use crate::builder::error::Hook;
use crate::builder::transition::EventBuilder;
use crate::core::Callback;
use crate::host::Host;

/// Declarations for one state: enter/exit hooks and event blocks.
///
/// The same builder is used for [`all_states`](super::StateMachineBuilder::all_states),
/// where every declaration is applied to each state in turn.
pub struct StateBuilder<H: Host> {
    pub(crate) hooks: Vec<(Hook, Callback<H>)>,
    pub(crate) events: Vec<(String, EventBuilder<H>)>,
}

impl<H: Host> StateBuilder<H> {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Callback run when the state is entered. May be declared once per state.
    pub fn enter(mut self, callback: impl Into<Callback<H>>) -> Self {
        self.hooks.push((Hook::Enter, callback.into()));
        self
    }

    /// Callback run when the state is left. May be declared once per state.
    pub fn exit(mut self, callback: impl Into<Callback<H>>) -> Self {
        self.hooks.push((Hook::Exit, callback.into()));
        self
    }

    /// Declare transitions out of this state on `event`.
    pub fn on(
        mut self,
        event: impl Into<String>,
        define: impl FnOnce(EventBuilder<H>) -> EventBuilder<H>,
    ) -> Self {
        self.events.push((event.into(), define(EventBuilder::new())));
        self
    }
}

impl<H: Host> Default for StateBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Clone for StateBuilder<H> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
            events: self.events.clone(),
        }
    }
}
