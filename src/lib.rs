//! Warden: finite state machines attached to host objects
//!
//! A machine is defined once per host type and shared by every host of that
//! type. Each host stores its own current state; the machine decides which
//! transition an event takes and runs the transition's effects against the
//! host.
//!
//! # Core Concepts
//!
//! - **Host**: the object a machine governs, via the [`Host`] trait
//! - **Conditions**: guards that must all pass for a transition to be taken
//! - **Callbacks**: actions and enter/exit hooks run during a transition
//! - **Machines**: several independent machines on one host type, sharing events
//!
//! # Example
//!
//! ```rust
//! use warden::builder::StateMachineBuilder;
//! use warden::core::{Callback, Condition};
//! use warden::host::{Host, StateSlots};
//!
//! #[derive(Default)]
//! struct Monster {
//!     slots: StateSlots,
//!     likes: Vec<String>,
//!     meals: u32,
//! }
//!
//! impl Host for Monster {
//!     type Arg = String;
//!     fn read_state(&self, attribute: &str) -> Option<String> {
//!         self.slots.get(attribute).map(str::to_owned)
//!     }
//!     fn write_state(&mut self, attribute: &str, state: &str) {
//!         self.slots.set(attribute, state);
//!     }
//! }
//!
//! let machine = StateMachineBuilder::<Monster>::new()
//!     .initial_state("hungry")
//!     .state("hungry", |s| {
//!         s.on("feed", |e| {
//!             e.action(Callback::new(|m: &mut Monster| m.meals += 1))
//!                 .transition(|t| {
//!                     t.to("satiated").guard(
//!                         Condition::with_args(|m: &Monster, food: &[String]| {
//!                             food.iter().all(|f| m.likes.contains(f))
//!                         })
//!                         .with_failure_message("it doesn't like that"),
//!                     )
//!                 })
//!                 .transition(|t| t.to_self())
//!         })
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut monster = Monster {
//!     likes: vec!["hamburger".to_string()],
//!     ..Monster::default()
//! };
//!
//! let tofu = ["tofu".to_string()];
//! let hamburger = ["hamburger".to_string()];
//! assert_eq!(machine.fire_strict(&mut monster, "feed", &tofu).unwrap(), "hungry");
//! assert_eq!(machine.fire_strict(&mut monster, "feed", &hamburger).unwrap(), "satiated");
//! assert_eq!(monster.meals, 2);
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod error;
pub mod host;

// Re-export commonly used types
pub use builder::{DefinitionError, MachineDefinition, StateMachineBuilder};
pub use core::{Callback, Condition, Event, State, Transition};
pub use engine::{FiringResult, ImpossibleEvent, Machines, Outcome, StateMachine};
pub use error::Error;
pub use host::{Host, HostError, StateSlots};
