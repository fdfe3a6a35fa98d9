//! Declarative machine definitions.
//!
//! A [`MachineDefinition`] describes a machine in data, with every guard and
//! action given as a named host operation. It is built with the same rules
//! as the fluent [`StateMachineBuilder`].

use crate::builder::error::DefinitionError;
use crate::builder::machine::StateMachineBuilder;
use crate::builder::state::StateBuilder;
use crate::builder::transition::{EventBuilder, TransitionBuilder};
use crate::core::Condition;
use crate::engine::StateMachine;
use crate::host::Host;
use serde::{Deserialize, Serialize};

/// A complete machine description.
///
/// `all_states` events are applied after every entry of `states`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_attribute: Option<String>,
    #[serde(default)]
    pub states: Vec<StateDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_states: Vec<EventDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<GuardDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<GuardDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A guard: either a bare operation name or an operation with the message
/// reported when it fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuardDefinition {
    Operation(String),
    Detailed {
        operation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        failure_message: Option<String>,
    },
}

impl GuardDefinition {
    fn into_condition<H: Host>(self) -> Condition<H> {
        match self {
            Self::Operation(operation) => Condition::operation(operation),
            Self::Detailed {
                operation,
                failure_message: None,
            } => Condition::operation(operation),
            Self::Detailed {
                operation,
                failure_message: Some(message),
            } => Condition::operation(operation).with_failure_message(message),
        }
    }
}

impl MachineDefinition {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Translate into a builder, so inline hooks or further states can be added.
    pub fn into_builder<H: Host>(self) -> StateMachineBuilder<H> {
        let mut builder = StateMachineBuilder::new();
        if let Some(name) = self.name {
            builder = builder.named(name);
        }
        if let Some(attribute) = self.state_attribute {
            builder = builder.state_attribute(attribute);
        }
        if let Some(initial) = self.initial_state {
            builder = builder.initial_state(&initial);
        }
        for state in self.states {
            let name = state.name.clone();
            builder = builder.state(&name, |s| state.apply(s));
        }
        if !self.all_states.is_empty() {
            let events = self.all_states;
            builder = builder.all_states(|s| apply_events(s, events));
        }
        builder
    }

    pub fn build<H: Host>(self) -> Result<StateMachine<H>, DefinitionError> {
        self.into_builder().build()
    }
}

impl StateDefinition {
    fn apply<H: Host>(self, mut builder: StateBuilder<H>) -> StateBuilder<H> {
        if let Some(enter) = self.enter {
            builder = builder.enter(enter);
        }
        if let Some(exit) = self.exit {
            builder = builder.exit(exit);
        }
        apply_events(builder, self.events)
    }
}

impl EventDefinition {
    fn apply<H: Host>(self, mut builder: EventBuilder<H>) -> EventBuilder<H> {
        if let Some(to) = self.to {
            builder = builder.to(to);
        }
        for guard in self.guards {
            builder = builder.guard(guard.into_condition());
        }
        if let Some(action) = self.action {
            builder = builder.action(action);
        }
        for transition in self.transitions {
            builder = builder.transition(|t| transition.apply(t));
        }
        builder
    }
}

impl TransitionDefinition {
    fn apply<H: Host>(self, mut builder: TransitionBuilder<H>) -> TransitionBuilder<H> {
        if let Some(to) = self.to {
            builder = builder.to(to);
        }
        for guard in self.guards {
            builder = builder.guard(guard.into_condition());
        }
        if let Some(action) = self.action {
            builder = builder.action(action);
        }
        if let Some(comment) = self.comment {
            builder = builder.comment(comment);
        }
        builder
    }
}

fn apply_events<H: Host>(mut builder: StateBuilder<H>, events: Vec<EventDefinition>) -> StateBuilder<H> {
    for event in events {
        let name = event.name.clone();
        builder = builder.on(name, |e| event.apply(e));
    }
    builder
}
