//! Every machine of one host type, and event dispatch across them.

use crate::builder::DefinitionError;
use crate::engine::machine::StateMachine;
use crate::engine::result::{FiringResult, ImpossibleEvent, Transitioned};
use crate::error::Error;
use crate::host::Host;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Result of dispatching an event to every machine that declares it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// At least one machine transitioned.
    Accepted(Vec<Transitioned>),

    /// Every machine asked rejected the event.
    Rejected(ImpossibleEvent),
}

impl Outcome {
    /// True when at least one machine transitioned.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Transitions taken, empty on rejection.
    pub fn transitions(&self) -> &[Transitioned] {
        match self {
            Self::Accepted(transitions) => transitions,
            Self::Rejected(_) => &[],
        }
    }

    /// Combined rejection, if every machine rejected.
    pub fn rejection(&self) -> Option<&ImpossibleEvent> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// The machines of a host type, keyed by name.
///
/// The default machine is keyed `statemachine`. Registration builds the
/// event lookup table used by [`Machines::trigger`].
pub struct Machines<H: Host> {
    machines: Vec<StateMachine<H>>,
    index: HashMap<String, usize>,
    triggers: BTreeMap<String, Vec<usize>>,
}

impl<H: Host> Machines<H> {
    /// Empty machine set.
    pub fn new() -> Self {
        Self {
            machines: Vec::new(),
            index: HashMap::new(),
            triggers: BTreeMap::new(),
        }
    }

    /// Register a machine. Two machines may not share a name.
    pub fn define(&mut self, machine: StateMachine<H>) -> Result<&StateMachine<H>, DefinitionError> {
        let label = machine.label().to_string();
        if self.index.contains_key(&label) {
            return Err(DefinitionError::DuplicateMachine { name: label });
        }

        let position = self.machines.len();
        for event in machine.events() {
            self.triggers
                .entry(event.name().to_string())
                .or_default()
                .push(position);
        }
        debug!(machine = %label, "state machine defined");
        self.index.insert(label, position);
        self.machines.push(machine);
        Ok(&self.machines[position])
    }

    /// Builder-style [`Machines::define`].
    pub fn with(mut self, machine: StateMachine<H>) -> Result<Self, DefinitionError> {
        self.define(machine)?;
        Ok(self)
    }

    /// Machine registered under `name`.
    pub fn get(&self, name: &str) -> Option<&StateMachine<H>> {
        self.index.get(name).map(|&position| &self.machines[position])
    }

    /// Machines in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &StateMachine<H>> {
        self.machines.iter()
    }

    /// Number of machines.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// True when no machine is defined.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Every event declared by any machine, sorted by name.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.triggers.keys().map(String::as_str)
    }

    /// Entry point for one event.
    pub fn trigger(&self, event: &str) -> Result<Trigger<'_, H>, Error> {
        let (event, targets) = self
            .triggers
            .get_key_value(event)
            .ok_or_else(|| Error::UnknownEvent {
                scope: "this host type".to_string(),
                event: event.to_string(),
            })?;
        Ok(Trigger {
            machines: self,
            event,
            targets,
        })
    }

    /// Fire `event` on every machine that declares it, reporting an overall
    /// rejection as a value.
    pub fn fire(&self, host: &mut H, event: &str, args: &[H::Arg]) -> Result<Outcome, Error> {
        self.trigger(event)?.fire(host, args)
    }

    /// Fire `event` on every machine that declares it, raising
    /// [`Error::ImpossibleEvent`] if all of them reject.
    pub fn fire_strict(
        &self,
        host: &mut H,
        event: &str,
        args: &[H::Arg],
    ) -> Result<Vec<Transitioned>, Error> {
        self.trigger(event)?.fire_strict(host, args)
    }

    /// Initialize `host` in every machine, in definition order.
    pub fn initialize(&self, host: &mut H) -> Result<(), Error> {
        self.machines
            .iter()
            .try_for_each(|machine| machine.initialize(host))
    }
}

impl<H: Host> Default for Machines<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// One event bound to the machines that declare it.
pub struct Trigger<'a, H: Host> {
    machines: &'a Machines<H>,
    event: &'a str,
    targets: &'a [usize],
}

impl<'a, H: Host> Trigger<'a, H> {
    /// Name of the bound event.
    pub fn event(&self) -> &str {
        self.event
    }

    /// Machines this event is forwarded to, in definition order.
    pub fn machines(&self) -> impl Iterator<Item = &'a StateMachine<H>> + 'a {
        let machines = self.machines;
        self.targets
            .iter()
            .map(move |&position| &machines.machines[position])
    }

    /// Fire the event on every bound machine, reporting an overall rejection
    /// as a value.
    ///
    /// Unknown or invalid stored states and re-entrant firing are checked on
    /// every machine before any of them runs. A callback or save that fails
    /// later still leaves earlier machines transitioned unless the host's
    /// [`Host::transaction`] rolls back.
    pub fn fire(&self, host: &mut H, args: &[H::Arg]) -> Result<Outcome, Error> {
        match self.dispatch(host, args, false) {
            Err(err @ Error::Persistence { .. }) => Ok(Outcome::Rejected(ImpossibleEvent::new(
                host.identity(),
                self.event,
                vec![err.to_string()],
            ))),
            other => other,
        }
    }

    /// Fire the event on every bound machine, raising
    /// [`Error::ImpossibleEvent`] if all of them reject.
    pub fn fire_strict(&self, host: &mut H, args: &[H::Arg]) -> Result<Vec<Transitioned>, Error> {
        match self.dispatch(host, args, true)? {
            Outcome::Accepted(transitions) => Ok(transitions),
            Outcome::Rejected(rejection) => Err(Error::ImpossibleEvent(rejection)),
        }
    }

    fn dispatch(&self, host: &mut H, args: &[H::Arg], strict: bool) -> Result<Outcome, Error> {
        host.transaction(|host| {
            for machine in self.machines() {
                machine.preflight(host, self.event)?;
            }

            let mut accepted = Vec::new();
            let mut rejections = Vec::new();

            for machine in self.machines() {
                match machine.attempt(host, self.event, args)? {
                    FiringResult::Transitioned(state) => accepted.push(Transitioned {
                        machine: machine.label().to_string(),
                        state,
                    }),
                    FiringResult::Rejected(reasons) => {
                        rejections.push(machine.rejection(host, self.event, reasons))
                    }
                }
            }

            if !accepted.is_empty() {
                return Ok(Outcome::Accepted(accepted));
            }

            let rejection = ImpossibleEvent::combine(rejections);
            debug!(event = self.event, reasons = ?rejection.reasons, "every machine rejected the event");
            if strict {
                Err(Error::ImpossibleEvent(rejection))
            } else {
                Ok(Outcome::Rejected(rejection))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateMachineBuilder;
    use crate::core::Condition;
    use crate::engine::DEFAULT_MACHINE;
    use crate::host::StateSlots;

    #[derive(Default)]
    struct Lamp {
        slots: StateSlots,
        plugged_in: bool,
    }

    impl Host for Lamp {
        type Arg = ();

        fn read_state(&self, attribute: &str) -> Option<String> {
            self.slots.get(attribute).map(str::to_owned)
        }

        fn write_state(&mut self, attribute: &str, state: &str) {
            self.slots.set(attribute, state);
        }
    }

    fn power() -> StateMachine<Lamp> {
        StateMachineBuilder::<Lamp>::new()
            .named("power")
            .initial_state("off")
            .state("off", |s| {
                s.on("toggle", |e| {
                    e.to("on").guard(
                        Condition::new(|l: &Lamp| l.plugged_in)
                            .with_failure_message("it is unplugged"),
                    )
                })
            })
            .state("on", |s| s.on("toggle", |e| e.to("off")))
            .build()
            .unwrap()
    }

    fn dimmer() -> StateMachine<Lamp> {
        StateMachineBuilder::<Lamp>::new()
            .named("dimmer")
            .initial_state("bright")
            .state("bright", |s| s.on("dim", |e| e.to("dark")))
            .state("dark", |s| {
                s.on("toggle", |e| {
                    e.to("bright").guard(
                        Condition::new(|l: &Lamp| l.plugged_in)
                            .with_failure_message("it is unplugged"),
                    )
                })
            })
            .build()
            .unwrap()
    }

    fn machines() -> Machines<Lamp> {
        Machines::new().with(power()).unwrap().with(dimmer()).unwrap()
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut machines = machines();
        let err = machines.define(power()).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateMachine { ref name } if name == "power"));
    }

    #[test]
    fn default_machine_key() {
        let default = StateMachineBuilder::<Lamp>::new()
            .initial_state("off")
            .build()
            .unwrap();
        let machines = Machines::new().with(default).unwrap();

        assert!(machines.get(DEFAULT_MACHINE).is_some());
        assert_eq!(machines.len(), 1);
    }

    #[test]
    fn triggers_cover_every_event() {
        let machines = machines();

        assert_eq!(machines.events().collect::<Vec<_>>(), vec!["dim", "toggle"]);
        let labels: Vec<&str> = machines
            .trigger("toggle")
            .unwrap()
            .machines()
            .map(StateMachine::label)
            .collect();
        assert_eq!(labels, vec!["power", "dimmer"]);
        assert!(matches!(machines.trigger("explode"), Err(Error::UnknownEvent { .. })));
    }

    #[test]
    fn success_when_any_machine_transitions() {
        let machines = machines();
        let mut lamp = Lamp {
            plugged_in: true,
            ..Lamp::default()
        };

        let outcome = machines.fire(&mut lamp, "toggle", &[]).unwrap();

        assert_eq!(
            outcome.transitions(),
            &[Transitioned {
                machine: "power".to_string(),
                state: "on".to_string()
            }]
        );
        assert_eq!(lamp.read_state("power_state").as_deref(), Some("on"));
        assert_eq!(lamp.read_state("dimmer_state"), None);
    }

    #[test]
    fn rejection_when_every_machine_rejects() {
        let machines = machines();
        let mut lamp = Lamp::default();
        machines.fire_strict(&mut lamp, "dim", &[]).unwrap();

        let outcome = machines.fire(&mut lamp, "toggle", &[]).unwrap();
        let rejection = outcome.rejection().unwrap();

        assert_eq!(rejection.reasons, vec!["it is unplugged"]);
        assert_eq!(rejection.events, vec!["toggle"]);
        assert_eq!(rejection.hosts, vec!["Lamp"]);
        assert_eq!(rejection.message.lines().count(), 1);

        let err = machines.fire_strict(&mut lamp, "toggle", &[]).unwrap_err();
        assert!(err.is_impossible_event());
    }

    #[test]
    fn initialize_stores_every_initial_state() {
        let machines = machines();
        let mut lamp = Lamp::default();

        machines.initialize(&mut lamp).unwrap();

        assert_eq!(lamp.read_state("power_state").as_deref(), Some("off"));
        assert_eq!(lamp.read_state("dimmer_state").as_deref(), Some("bright"));
    }

    #[test]
    fn invalid_state_in_any_machine_stops_all_of_them() {
        let machines = machines();
        let mut lamp = Lamp {
            plugged_in: true,
            ..Lamp::default()
        };
        lamp.write_state("dimmer_state", "flickering");

        let err = machines.fire(&mut lamp, "toggle", &[]).unwrap_err();

        assert!(matches!(err, Error::InvalidState { ref machine, .. } if machine == "dimmer"));
        assert_eq!(lamp.read_state("power_state"), None);
    }
}
