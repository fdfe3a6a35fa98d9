//! State machine that selects and executes transitions for a host.

use crate::core::registry::Registry;
use crate::core::{Event, State, StateId, Transition};
use crate::engine::result::{push_unique, FiringResult, ImpossibleEvent};
use crate::engine::store::StateStore;
use crate::engine::DEFAULT_MACHINE;
use crate::error::Error;
use crate::host::Host;
use std::cell::{Cell, RefCell};
use std::fmt;
use tracing::{debug, trace, warn};

/// Observer run for every fired event, whether or not it transitions.
pub(crate) type EventHook<H> = Box<dyn Fn(&mut H, &Event, &[<H as Host>::Arg])>;

/// Observer run for every transition taken.
pub(crate) type TransitionHook<H> = Box<dyn Fn(&mut H, &Traversal<'_, H>, &[<H as Host>::Arg])>;

/// The transition being traversed, as seen by `on_all_transitions`.
pub struct Traversal<'a, H: Host> {
    pub event: &'a Event,
    pub transition: &'a Transition<H>,
    pub from: &'a State<H>,
    pub to: &'a State<H>,
}

impl<H: Host> fmt::Display for Traversal<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.event, self.from, self.to)
    }
}

/// Raised for the duration of a traversal; lowered on drop, including when a
/// callback fails part-way.
struct TransitioningFlag<'a>(&'a Cell<bool>);

impl<'a> TransitioningFlag<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for TransitioningFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A state/event/transition graph plus the algorithm that fires events
/// against a host.
///
/// One machine is shared by every host of its type; per-host state lives in
/// the host. The machine is not `Sync`: firing the same machine from several
/// threads must be serialized by the caller.
///
/// # Example
///
/// ```rust
/// use warden::builder::StateMachineBuilder;
/// use warden::engine::FiringResult;
/// use warden::host::{Host, StateSlots};
///
/// #[derive(Default)]
/// struct Job {
///     slots: StateSlots,
/// }
///
/// impl Host for Job {
///     type Arg = ();
///     fn read_state(&self, attribute: &str) -> Option<String> {
///         self.slots.get(attribute).map(str::to_owned)
///     }
///     fn write_state(&mut self, attribute: &str, state: &str) {
///         self.slots.set(attribute, state);
///     }
/// }
///
/// let machine = StateMachineBuilder::<Job>::new()
///     .initial_state("idle")
///     .state("idle", |s| s.on("start", |e| e.to("running")))
///     .state("running", |s| s.on("stop", |e| e.to("stopped")))
///     .build()
///     .unwrap();
///
/// let mut job = Job::default();
/// assert_eq!(
///     machine.fire(&mut job, "start", &[]).unwrap(),
///     FiringResult::Transitioned("running".to_string())
/// );
/// assert_eq!(machine.current_state(&job).unwrap().name(), "running");
/// ```
pub struct StateMachine<H: Host> {
    pub(crate) name: Option<String>,
    pub(crate) states: Registry<State<H>>,
    pub(crate) events: Registry<Event>,
    pub(crate) initial: StateId,
    pub(crate) store: StateStore<H>,
    pub(crate) on_all_events: Option<EventHook<H>>,
    pub(crate) on_all_transitions: Option<TransitionHook<H>>,
    pub(crate) transitioning: Cell<bool>,
    pub(crate) failure_reasons: RefCell<Vec<String>>,
}

impl<H: Host> StateMachine<H> {
    /// Name given at definition, `None` for the default machine.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used to register and report this machine.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MACHINE)
    }

    /// Attribute the host stores this machine's state under, unless a
    /// custom accessor is configured.
    pub fn state_attribute(&self) -> Option<&str> {
        self.store.attribute()
    }

    /// State a host without a stored value is in.
    pub fn initial_state(&self) -> &State<H> {
        self.node(self.initial)
    }

    /// State declared under `name`.
    pub fn state(&self, name: &str) -> Option<&State<H>> {
        self.states.get(name)
    }

    /// State behind `id`, `None` if the id belongs to another machine.
    pub fn state_at(&self, id: StateId) -> Option<&State<H>> {
        self.states.get_at(id.0)
    }

    /// States in definition order.
    pub fn states(&self) -> impl Iterator<Item = &State<H>> {
        self.states.iter()
    }

    /// Event declared under `name`.
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    /// Events in definition order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Whether any state of this machine handles `event`.
    pub fn declares(&self, event: &str) -> bool {
        self.events.position(event).is_some()
    }

    /// True only while a transition's effects are running.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning.get()
    }

    /// Reasons accumulated by the most recent transition selection.
    pub fn last_failure_reasons(&self) -> Vec<String> {
        self.failure_reasons.borrow().clone()
    }

    /// The host's current state: the stored value, or the initial state if
    /// nothing is stored yet.
    pub fn current_state(&self, host: &H) -> Result<&State<H>, Error> {
        match self.store.read(host) {
            None => Ok(self.initial_state()),
            Some(stored) => self.states.get(&stored).ok_or_else(|| Error::InvalidState {
                machine: self.label().to_string(),
                host: host.identity(),
                state: stored.clone(),
            }),
        }
    }

    /// Write the host's state directly.
    ///
    /// Outside a traversal the old state's exit and the new state's enter
    /// callbacks run around the write. Inside one, only the value is written
    /// and the traversal enters the written state instead of its target.
    pub fn set_state(&self, host: &mut H, state: &str) -> Result<(), Error> {
        let target = self.states.get(state).ok_or_else(|| Error::UnknownState {
            machine: self.label().to_string(),
            state: state.to_string(),
        })?;

        if self.is_transitioning() {
            self.store.write(host, target.name());
            return Ok(());
        }

        let from = self.current_state(host)?;
        if let Some(exit) = from.exit() {
            exit.call(host, &[])?;
        }
        self.store.write(host, target.name());
        if let Some(enter) = target.enter() {
            enter.call(host, &[])?;
        }
        Ok(())
    }

    /// Store the initial state on a host that has none yet and run its
    /// enter callback. Hosts that already carry a state are left alone.
    pub fn initialize(&self, host: &mut H) -> Result<(), Error> {
        if self.store.read(host).is_some() {
            return Ok(());
        }
        let initial = self.initial_state();
        self.store.write(host, initial.name());
        if let Some(enter) = initial.enter() {
            enter.call(host, &[])?;
        }
        Ok(())
    }

    /// Select the transition `event` would take, without running anything.
    pub fn determine_transition(
        &self,
        host: &H,
        event: &str,
        args: &[H::Arg],
    ) -> Result<Option<&Transition<H>>, Error> {
        let event = self.event_named(event)?;
        let from = self.current_state(host)?;
        self.select(host, from, event, args)
    }

    /// Name of the state `event` would lead to, or `None` if it would be rejected.
    pub fn determine_state_after(
        &self,
        host: &H,
        event: &str,
        args: &[H::Arg],
    ) -> Result<Option<&str>, Error> {
        let transition = self.determine_transition(host, event, args)?;
        Ok(transition.map(|t| self.node(t.to()).name()))
    }

    /// Fire `event`, reporting a rejection as a value.
    ///
    /// A failed save after the transition is reported as a rejection too;
    /// the in-memory state change is kept.
    pub fn fire(&self, host: &mut H, event: &str, args: &[H::Arg]) -> Result<FiringResult, Error> {
        match host.transaction(|host| self.attempt(host, event, args)) {
            Err(err @ Error::Persistence { .. }) => Ok(FiringResult::Rejected(vec![err.to_string()])),
            other => other,
        }
    }

    /// Fire `event`, raising [`Error::ImpossibleEvent`] on rejection.
    ///
    /// Returns the new state name.
    pub fn fire_strict(&self, host: &mut H, event: &str, args: &[H::Arg]) -> Result<String, Error> {
        host.transaction(|host| match self.attempt(host, event, args)? {
            FiringResult::Transitioned(state) => Ok(state),
            FiringResult::Rejected(reasons) => {
                Err(Error::ImpossibleEvent(self.rejection(host, event, reasons)))
            }
        })
    }

    /// Render a transition for diagnostics.
    pub fn describe(&self, transition: &Transition<H>) -> String {
        let mut text = format!(
            "Transition from {} to {}",
            self.node(transition.from()),
            self.node(transition.to())
        );
        if !transition.guards().is_empty() {
            let guards: Vec<String> = transition.guards().iter().map(|g| g.to_string()).collect();
            text.push_str(&format!(" [{}]", guards.join(" and ")));
        }
        if let Some(action) = transition.action() {
            text.push_str(&format!(" / {action}"));
        }
        text
    }

    pub(crate) fn rejection(&self, host: &H, event: &str, reasons: Vec<String>) -> ImpossibleEvent {
        ImpossibleEvent::new(host.identity(), event, reasons)
    }

    /// One firing, without transaction wrapping or calling-convention
    /// conversion.
    pub(crate) fn attempt(
        &self,
        host: &mut H,
        event: &str,
        args: &[H::Arg],
    ) -> Result<FiringResult, Error> {
        let event = self.event_named(event)?;
        self.ensure_idle(event)?;
        let from = self.current_state(host)?;
        let selected = self.select(host, from, event, args)?;

        if let Some(hook) = &self.on_all_events {
            hook(host, event, args);
        }

        let Some(transition) = selected else {
            let reasons = self.last_failure_reasons();
            debug!(
                machine = self.label(),
                event = event.name(),
                state = from.name(),
                ?reasons,
                "event rejected"
            );
            return Ok(FiringResult::Rejected(reasons));
        };

        let to = self.traverse(host, event, transition, args)?;
        debug!(
            machine = self.label(),
            event = event.name(),
            from = from.name(),
            to = to.name(),
            "transitioned"
        );

        if let Err(source) = host.save() {
            warn!(machine = self.label(), error = %source, "saving host after transition failed");
            return Err(Error::Persistence {
                host: host.identity(),
                source,
            });
        }

        Ok(FiringResult::Transitioned(to.name().to_string()))
    }

    /// Fail with the errors a firing would raise before
    /// touching the host.
    pub(crate) fn preflight(&self, host: &H, event: &str) -> Result<(), Error> {
        let event = self.event_named(event)?;
        self.ensure_idle(event)?;
        self.current_state(host).map(|_| ())
    }

    fn ensure_idle(&self, event: &Event) -> Result<(), Error> {
        if self.is_transitioning() {
            return Err(Error::ReentrantFiring {
                machine: self.label().to_string(),
                event: event.name().to_string(),
            });
        }
        Ok(())
    }

    fn event_named(&self, name: &str) -> Result<&Event, Error> {
        self.events.get(name).ok_or_else(|| Error::UnknownEvent {
            scope: format!("'{}'", self.label()),
            event: name.to_string(),
        })
    }

    /// First-match-wins selection among `from`'s candidates for `event`.
    /// Records the first failing guard of each rejected candidate.
    fn select<'m>(
        &'m self,
        host: &H,
        from: &'m State<H>,
        event: &Event,
        args: &[H::Arg],
    ) -> Result<Option<&'m Transition<H>>, Error> {
        let mut reasons = Vec::new();
        let mut selected = None;

        match from.transitions_on(event.name()) {
            None => reasons.push(format!(
                "state '{}' has no outgoing transitions on event '{}'",
                from.name(),
                event.name()
            )),
            Some(candidates) => {
                for candidate in candidates {
                    match candidate.first_failing_guard(host, args)? {
                        None => {
                            selected = Some(candidate);
                            break;
                        }
                        Some(guard) => {
                            trace!(
                                machine = self.label(),
                                candidate = %self.describe(candidate),
                                guard = %guard,
                                "guard failed"
                            );
                            push_unique(&mut reasons, guard.failure_message());
                        }
                    }
                }
            }
        }

        *self.failure_reasons.borrow_mut() = reasons;
        Ok(selected)
    }

    /// Run a selected transition. Returns the state the host settles in,
    /// which differs from the target when an action wrote the state directly.
    fn traverse(
        &self,
        host: &mut H,
        event: &Event,
        transition: &Transition<H>,
        args: &[H::Arg],
    ) -> Result<&State<H>, Error> {
        let from = self.node(transition.from());
        let to = self.node(transition.to());
        let _flag = TransitioningFlag::raise(&self.transitioning);

        if let Some(exit) = from.exit() {
            exit.call(host, args)?;
        }
        self.store.write(host, to.name());
        if let Some(action) = transition.action() {
            action.call(host, args)?;
        }
        if let Some(hook) = &self.on_all_transitions {
            let traversal = Traversal {
                event,
                transition,
                from,
                to,
            };
            hook(host, &traversal, args);
        }
        let settled = self.current_state(host)?;
        if let Some(enter) = settled.enter() {
            enter.call(host, args)?;
        }
        Ok(settled)
    }

    fn node(&self, id: StateId) -> &State<H> {
        self.states.at(id.0)
    }
}

impl<H: Host> fmt::Debug for StateMachine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.label())
            .field("initial_state", &self.initial_state().name())
            .field("states", &self.states.iter().map(State::name).collect::<Vec<_>>())
            .field("events", &self.events.iter().map(Event::name).collect::<Vec<_>>())
            .field("store", &self.store)
            .finish()
    }
}

impl<H: Host> fmt::Display for StateMachine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
