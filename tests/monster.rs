//! A monster with two machines: its affect (how it feels) and its mouth.
//!
//! Exercises multiple machines on one host type, guard inheritance,
//! self-transitions and event-argument forwarding.

use warden::builder::StateMachineBuilder;
use warden::core::{Callback, Condition, Event};
use warden::engine::{Machines, StateMachine, Transitioned, Traversal};
use warden::error::Error;
use warden::host::{Arity, Host, HostError, StateSlots};

#[derive(Default)]
struct Monster {
    slots: StateSlots,
    deeds: Vec<String>,
    journal: Vec<String>,
    heard: Vec<String>,
}

impl Monster {
    fn deed(&mut self, deed: &str) {
        self.deeds.push(deed.to_string());
    }
}

impl Host for Monster {
    type Arg = String;

    fn read_state(&self, attribute: &str) -> Option<String> {
        self.slots.get(attribute).map(str::to_owned)
    }

    fn write_state(&mut self, attribute: &str, state: &str) {
        self.slots.set(attribute, state);
    }

    fn arity(operation: &str) -> Option<Arity> {
        match operation {
            "stretch" | "grumble" | "yawn" | "barf" | "is_tired" | "mouth_is_open" => {
                Some(Arity::Nullary)
            }
            "likes_food" | "hates_food" => Some(Arity::Forward),
            _ => None,
        }
    }

    fn call(&mut self, operation: &str, _args: &[String]) -> Result<(), HostError> {
        match operation {
            "stretch" => self.deed("stretched"),
            "grumble" => self.deed("grumbled"),
            "yawn" => self.deed("yawned"),
            "barf" => self.deed("barfed"),
            other => return Err(HostError::UnknownOperation(other.to_string())),
        }
        Ok(())
    }

    fn test(&self, operation: &str, args: &[String]) -> Result<bool, HostError> {
        let food = args.first().map(String::as_str);
        match operation {
            "likes_food" => Ok(food == Some("hamburger")),
            "hates_food" => Ok(food == Some("tofu")),
            "is_tired" => Ok(self.deeds.last().map(String::as_str) == Some("yawned")),
            "mouth_is_open" => Ok(self.read_state("mouth_state").as_deref() == Some("open")),
            other => Err(HostError::UnknownOperation(other.to_string())),
        }
    }
}

fn affect() -> StateMachine<Monster> {
    StateMachineBuilder::<Monster>::new()
        .named("affect")
        .initial_state("sleeping")
        .on_all_transitions(|m: &mut Monster, t: &Traversal<'_, Monster>, _args: &[String]| {
            m.journal.push(t.event.name().to_string())
        })
        .state("sleeping", |s| s.on("wake_up", |e| e.to("hungry")).exit("stretch"))
        .state("hungry", |s| {
            s.enter("grumble")
                .on("feed", |e| {
                    e.guard(
                        Condition::operation("mouth_is_open")
                            .with_failure_message("its mouth is not open"),
                    )
                    .transition(|t| {
                        t.to("satiated")
                            .guard(
                                Condition::operation("likes_food")
                                    .with_failure_message("it does not like the food"),
                            )
                            .action(Callback::with_args(|m: &mut Monster, food: &[String]| {
                                m.deed(&format!("ate_tasty_{}", food.join("_")))
                            }))
                    })
                    .transition(|t| {
                        t.to("self")
                            .guard(
                                Condition::operation("hates_food")
                                    .with_failure_message("it does not hate the food"),
                            )
                            .action("barf")
                    })
                    .transition(|t| {
                        t.to_self()
                            .action(Callback::with_args(|m: &mut Monster, food: &[String]| {
                                m.deed(&format!("ate_{}", food.join("_")))
                            }))
                    })
                })
                .on("lullaby", |e| e.action("yawn"))
                .on("tickle", |e| e.action(Callback::new(|m: &mut Monster| m.deed("giggled"))))
        })
        .state("satiated", |s| {
            s.on("lullaby", |e| {
                e.transition(|t| t.to("sleeping").guard("is_tired"))
                    .transition(|t| t.to_self().action("yawn"))
            })
        })
        .build()
        .unwrap()
}

fn mouth() -> StateMachine<Monster> {
    StateMachineBuilder::<Monster>::new()
        .named("mouth")
        .initial_state("closed")
        .on_all_events(|m: &mut Monster, event: &Event, _args: &[String]| {
            m.heard.push(event.name().to_string())
        })
        .state("open", |s| s.on("lullaby", |e| e.to("closed")))
        .state("closed", |s| s.on("tickle", |e| e.to("open")))
        .build()
        .unwrap()
}

fn machines() -> Machines<Monster> {
    Machines::new().with(affect()).unwrap().with(mouth()).unwrap()
}

fn food(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

fn state_of(machines: &Machines<Monster>, machine: &str, monster: &Monster) -> String {
    machines
        .get(machine)
        .unwrap()
        .current_state(monster)
        .unwrap()
        .name()
        .to_string()
}

fn fire(machines: &Machines<Monster>, monster: &mut Monster, event: &str, args: &[String]) {
    machines.fire_strict(monster, event, args).unwrap();
}

#[test]
fn machines_start_in_their_initial_states() {
    let machines = machines();
    let monster = Monster::default();

    assert_eq!(machines.get("affect").unwrap().initial_state().name(), "sleeping");
    assert_eq!(machines.get("mouth").unwrap().initial_state().name(), "closed");
    assert_eq!(state_of(&machines, "affect", &monster), "sleeping");
    assert_eq!(state_of(&machines, "mouth", &monster), "closed");
    assert_eq!(machines.get("affect").unwrap().state_attribute(), Some("affect_state"));
}

#[test]
fn undeclared_event_is_an_error() {
    let machines = machines();
    let mut monster = Monster::default();

    let err = machines.fire_strict(&mut monster, "dance", &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownEvent { ref event, .. } if event == "dance"));
}

#[test]
fn event_possibility_within_states() {
    let machines = machines();
    let mut monster = Monster::default();

    assert!(machines.fire_strict(&mut monster, "feed", &[]).unwrap_err().is_impossible_event());
    assert!(machines.fire_strict(&mut monster, "lullaby", &[]).unwrap_err().is_impossible_event());
    fire(&machines, &mut monster, "wake_up", &[]);
    assert_eq!(state_of(&machines, "affect", &monster), "hungry");

    assert!(machines.fire_strict(&mut monster, "wake_up", &[]).unwrap_err().is_impossible_event());
    fire(&machines, &mut monster, "lullaby", &[]);
    assert_eq!(state_of(&machines, "affect", &monster), "hungry");

    assert!(machines
        .fire_strict(&mut monster, "feed", &food("hamburger"))
        .unwrap_err()
        .is_impossible_event());
    fire(&machines, &mut monster, "tickle", &[]);
    fire(&machines, &mut monster, "feed", &food("hamburger"));
    assert_eq!(state_of(&machines, "affect", &monster), "satiated");

    assert!(machines.fire_strict(&mut monster, "feed", &[]).unwrap_err().is_impossible_event());
    assert!(machines.fire_strict(&mut monster, "wake_up", &[]).unwrap_err().is_impossible_event());
}

#[test]
fn transition_decisions_follow_guards() {
    let machines = machines();
    let mut monster = Monster::default();
    fire(&machines, &mut monster, "wake_up", &[]);
    fire(&machines, &mut monster, "tickle", &[]);

    fire(&machines, &mut monster, "feed", &food("toast"));
    assert_eq!(state_of(&machines, "affect", &monster), "hungry");
    assert!(monster.deeds.contains(&"ate_toast".to_string()));
    assert!(!monster.deeds.contains(&"barfed".to_string()));

    fire(&machines, &mut monster, "feed", &food("tofu"));
    assert!(monster.deeds.contains(&"barfed".to_string()));
    assert_eq!(state_of(&machines, "affect", &monster), "hungry");

    fire(&machines, &mut monster, "feed", &food("hamburger"));
    assert_eq!(state_of(&machines, "affect", &monster), "satiated");
    assert!(monster.deeds.contains(&"ate_tasty_hamburger".to_string()));
}

#[test]
fn enter_and_exit_run_for_self_transitions_but_not_rejections() {
    let machines = machines();
    let mut monster = Monster::default();

    fire(&machines, &mut monster, "wake_up", &[]);
    assert!(machines.fire_strict(&mut monster, "wake_up", &[]).is_err());
    assert_eq!(monster.deeds, vec!["stretched", "grumbled"]);

    fire(&machines, &mut monster, "tickle", &[]);
    fire(&machines, &mut monster, "feed", &food("toast"));
    fire(&machines, &mut monster, "lullaby", &[]);
    fire(&machines, &mut monster, "tickle", &[]);
    fire(&machines, &mut monster, "feed", &food("tofu"));

    assert_eq!(
        monster.deeds,
        vec![
            "stretched", "grumbled", "giggled", "grumbled", "ate_toast", "grumbled", "yawned",
            "grumbled", "giggled", "grumbled", "barfed", "grumbled",
        ]
    );
}

#[test]
fn transition_actions_run_in_order() {
    let machines = machines();
    let mut monster = Monster::default();

    fire(&machines, &mut monster, "wake_up", &[]);
    fire(&machines, &mut monster, "tickle", &[]);
    fire(&machines, &mut monster, "feed", &food("toast"));
    fire(&machines, &mut monster, "lullaby", &[]);
    fire(&machines, &mut monster, "tickle", &[]);
    fire(&machines, &mut monster, "feed", &food("tofu"));
    fire(&machines, &mut monster, "feed", &food("hamburger"));
    fire(&machines, &mut monster, "lullaby", &[]);
    fire(&machines, &mut monster, "lullaby", &[]);

    assert_eq!(
        monster.deeds,
        vec![
            "stretched", "grumbled", "giggled", "grumbled", "ate_toast", "grumbled", "yawned",
            "grumbled", "giggled", "grumbled", "barfed", "grumbled", "ate_tasty_hamburger",
            "yawned",
        ]
    );
    assert_eq!(state_of(&machines, "affect", &monster), "sleeping");
}

#[test]
fn event_guard_blocks_every_nested_transition() {
    let machines = machines();
    let mut monster = Monster::default();
    fire(&machines, &mut monster, "wake_up", &[]);

    let outcome = machines.fire(&mut monster, "feed", &food("hamburger")).unwrap();

    let rejection = outcome.rejection().unwrap();
    assert_eq!(rejection.reasons, vec!["its mouth is not open"]);
    assert_eq!(rejection.human_explanation(), "'FEED' for Monster failed");
    assert!(!monster.deeds.iter().any(|deed| deed.starts_with("ate")));
}

#[test]
fn one_accepting_machine_is_enough() {
    let machines = machines();
    let mut monster = Monster::default();
    fire(&machines, &mut monster, "wake_up", &[]);

    let transitions = machines.fire_strict(&mut monster, "lullaby", &[]).unwrap();

    assert_eq!(
        transitions,
        vec![Transitioned {
            machine: "affect".to_string(),
            state: "hungry".to_string()
        }]
    );
    assert_eq!(state_of(&machines, "mouth", &monster), "closed");
}

#[test]
fn rejection_by_every_machine_combines_reasons() {
    let machines = machines();
    let mut monster = Monster::default();

    let err = machines.fire_strict(&mut monster, "lullaby", &[]).unwrap_err();

    let rejection = match err {
        Error::ImpossibleEvent(rejection) => rejection,
        other => panic!("Expected ImpossibleEvent, got {other:?}"),
    };
    assert_eq!(rejection.message.lines().count(), 2);
    assert_eq!(rejection.hosts, vec!["Monster"]);
    assert_eq!(
        rejection.reasons,
        vec![
            "state 'sleeping' has no outgoing transitions on event 'lullaby'",
            "state 'closed' has no outgoing transitions on event 'lullaby'",
        ]
    );
}

#[test]
fn machine_wide_hooks_observe_their_own_machine() {
    let machines = machines();
    let mut monster = Monster::default();

    fire(&machines, &mut monster, "wake_up", &[]);
    fire(&machines, &mut monster, "tickle", &[]);
    let _ = machines.fire(&mut monster, "wake_up", &[]).unwrap();
    fire(&machines, &mut monster, "lullaby", &[]);

    assert_eq!(monster.journal, vec!["wake_up", "tickle", "lullaby"]);
    assert_eq!(monster.heard, vec!["tickle", "lullaby"]);
}

#[test]
fn determination_predicts_without_firing() {
    let machines = machines();
    let affect = machines.get("affect").unwrap();
    let mut monster = Monster::default();
    fire(&machines, &mut monster, "wake_up", &[]);
    fire(&machines, &mut monster, "tickle", &[]);
    let deeds = monster.deeds.clone();

    assert_eq!(
        affect.determine_state_after(&monster, "feed", &food("hamburger")).unwrap(),
        Some("satiated")
    );
    assert_eq!(
        affect.determine_state_after(&monster, "feed", &food("tofu")).unwrap(),
        Some("hungry")
    );
    assert_eq!(affect.determine_state_after(&monster, "wake_up", &[]).unwrap(), None);
    assert_eq!(monster.deeds, deeds);
}
