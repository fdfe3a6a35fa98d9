//! Builder for constructing state machines.

use crate::builder::error::{DefinitionError, Hook};
use crate::builder::state::StateBuilder;
use crate::builder::transition::TargetRef;
use crate::core::registry::Registry;
use crate::core::{Callback, Condition, Event, State, StateId, Transition};
use crate::engine::store::StateStore;
use crate::engine::{EventHook, StateMachine, TransitionHook, Traversal, DEFAULT_MACHINE};
use crate::host::Host;
use std::cell::{Cell, RefCell};

/// Builder for constructing state machines with a fluent API.
///
/// Naming a state or event anywhere creates it on the spot; declaring it
/// again later adds to what is already there. Definition problems are
/// collected as they are found and the first one is reported by
/// [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use warden::builder::StateMachineBuilder;
/// use warden::core::Condition;
/// use warden::host::{Host, StateSlots};
///
/// #[derive(Default)]
/// struct Seminar {
///     slots: StateSlots,
///     seats: u32,
/// }
///
/// impl Host for Seminar {
///     type Arg = ();
///     fn read_state(&self, attribute: &str) -> Option<String> {
///         self.slots.get(attribute).map(str::to_owned)
///     }
///     fn write_state(&mut self, attribute: &str, state: &str) {
///         self.slots.set(attribute, state);
///     }
/// }
///
/// let machine = StateMachineBuilder::<Seminar>::new()
///     .initial_state("proposed")
///     .state("proposed", |s| s.on("schedule", |e| e.to("scheduled")))
///     .state("scheduled", |s| {
///         s.on("enroll", |e| {
///             e.guard(Condition::new(|s: &Seminar| s.seats > 0).with_failure_message("it is full"))
///                 .to_self()
///         })
///     })
///     .all_states(|s| s.on("cancel", |e| e.to("cancelled")))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.states().count(), 3);
/// assert!(machine.state("cancelled").unwrap().transitions_on("cancel").is_none());
/// ```
pub struct StateMachineBuilder<H: Host> {
    name: Option<String>,
    initial: Option<StateId>,
    store: Option<StateStore<H>>,
    states: Registry<State<H>>,
    events: Registry<Event>,
    on_all_events: Option<EventHook<H>>,
    on_all_transitions: Option<TransitionHook<H>>,
    errors: Vec<DefinitionError>,
}

impl<H: Host> StateMachineBuilder<H> {
    pub fn new() -> Self {
        Self {
            name: None,
            initial: None,
            store: None,
            states: Registry::new(),
            events: Registry::new(),
            on_all_events: None,
            on_all_transitions: None,
            errors: Vec::new(),
        }
    }

    /// Name this machine, for hosts that carry more than one.
    ///
    /// A named machine stores its state under `<name>_state` unless an
    /// attribute or accessor is configured.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the initial state (required).
    pub fn initial_state(mut self, state: &str) -> Self {
        self.initial = Some(self.ensure_state(state));
        self
    }

    /// Store the current state under `attribute` instead of the default.
    pub fn state_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.store = Some(StateStore::Attribute(attribute.into()));
        self
    }

    /// Read and write the current state through custom accessors instead of
    /// attribute storage.
    pub fn state_accessor<R, W>(mut self, read: R, write: W) -> Self
    where
        R: Fn(&H) -> Option<String> + 'static,
        W: Fn(&mut H, &str) + 'static,
    {
        self.store = Some(StateStore::accessor(read, write));
        self
    }

    /// Declare (or add to) the state `name`.
    pub fn state(
        mut self,
        name: &str,
        define: impl FnOnce(StateBuilder<H>) -> StateBuilder<H>,
    ) -> Self {
        let id = self.ensure_state(name);
        self.declare(id, define(StateBuilder::new()));
        self
    }

    /// Apply the same declarations to every state defined so far.
    ///
    /// States first named later, including ones first named inside `define`,
    /// are not affected.
    pub fn all_states(mut self, define: impl FnOnce(StateBuilder<H>) -> StateBuilder<H>) -> Self {
        let template = define(StateBuilder::new());
        let existing: Vec<StateId> = (0..self.states.len()).map(StateId).collect();
        for id in existing {
            self.declare(id, template.clone());
        }
        self
    }

    /// Observer run for every fired event, before any transition effects and
    /// even when the event is rejected.
    pub fn on_all_events<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut H, &Event, &[H::Arg]) + 'static,
    {
        self.on_all_events = Some(Box::new(hook));
        self
    }

    /// Observer run for every transition taken, after its action and before
    /// the target state's enter callback.
    pub fn on_all_transitions<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut H, &Traversal<'_, H>, &[H::Arg]) + 'static,
    {
        self.on_all_transitions = Some(Box::new(hook));
        self
    }

    /// Build the state machine.
    /// Returns the first definition problem found, if any.
    pub fn build(self) -> Result<StateMachine<H>, DefinitionError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        let initial = self.initial.ok_or_else(|| DefinitionError::MissingInitialState {
            machine: self
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_MACHINE.to_string()),
        })?;
        let store = self
            .store
            .unwrap_or_else(|| StateStore::default_for(self.name.as_deref()));

        Ok(StateMachine {
            name: self.name,
            states: self.states,
            events: self.events,
            initial,
            store,
            on_all_events: self.on_all_events,
            on_all_transitions: self.on_all_transitions,
            transitioning: Cell::new(false),
            failure_reasons: RefCell::new(Vec::new()),
        })
    }

    fn ensure_state(&mut self, name: &str) -> StateId {
        StateId(
            self.states
                .ensure(name, |position| State::new(StateId(position), name)),
        )
    }

    fn resolve(&mut self, declaring: StateId, target: Option<TargetRef>) -> StateId {
        match target {
            Some(TargetRef::Named(name)) => self.ensure_state(&name),
            Some(TargetRef::Declaring) | None => declaring,
        }
    }

    fn declare(&mut self, id: StateId, declared: StateBuilder<H>) {
        for (hook, callback) in declared.hooks {
            self.attach_hook(id, hook, callback);
        }

        for (event, block) in declared.events {
            self.events.ensure(&event, |_| Event::new(event.as_str()));
            for pending in block.into_transitions() {
                let to = self.resolve(id, pending.to);
                let mut transition = Transition::new(id, to);
                transition.guards = pending.guards;
                transition.action = pending.action;
                transition.comment = pending.comment;
                self.check_transition(&transition);
                self.states.at_mut(id.0).add_transition(&event, transition);
            }
        }
    }

    fn attach_hook(&mut self, id: StateId, hook: Hook, callback: Callback<H>) {
        self.check_callback(&callback);
        let state = self.states.at_mut(id.0);
        let slot = match hook {
            Hook::Enter => &mut state.enter,
            Hook::Exit => &mut state.exit,
        };
        if slot.is_some() {
            let state = state.name().to_string();
            self.errors
                .push(DefinitionError::DuplicateCallback { state, hook });
            return;
        }
        *slot = Some(callback);
    }

    fn check_transition(&mut self, transition: &Transition<H>) {
        transition
            .guards()
            .iter()
            .for_each(|guard| self.check_condition(guard));
        if let Some(action) = transition.action() {
            self.check_callback(action);
        }
    }

    fn check_callback(&mut self, callback: &Callback<H>) {
        if let Some(operation) = callback.unresolved_operation() {
            self.errors.push(DefinitionError::UnknownOperation {
                operation: operation.to_string(),
            });
        }
    }

    fn check_condition(&mut self, condition: &Condition<H>) {
        if let Some(operation) = condition.unresolved_operation() {
            self.errors.push(DefinitionError::UnknownOperation {
                operation: operation.to_string(),
            });
        }
    }
}

impl<H: Host> Default for StateMachineBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}
