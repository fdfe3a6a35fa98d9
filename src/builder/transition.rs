//! Builders for event blocks and the transitions nested in them.

use crate::core::{Callback, Condition};
use crate::host::Host;

/// Reserved target name meaning "the state being declared".
pub const SELF_TARGET: &str = "self";

/// Unresolved transition target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TargetRef {
    Named(String),
    Declaring,
}

impl TargetRef {
    fn from_name(name: String) -> Self {
        if name == SELF_TARGET {
            Self::Declaring
        } else {
            Self::Named(name)
        }
    }
}

/// One candidate transition declared inside an event block.
pub struct TransitionBuilder<H: Host> {
    pub(crate) to: Option<TargetRef>,
    pub(crate) guards: Vec<Condition<H>>,
    pub(crate) action: Option<Callback<H>>,
    pub(crate) comment: Option<String>,
}

impl<H: Host> TransitionBuilder<H> {
    pub fn new() -> Self {
        Self {
            to: None,
            guards: Vec::new(),
            action: None,
            comment: None,
        }
    }

    /// Target state. `"self"` names the declaring state.
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(TargetRef::from_name(state.into()));
        self
    }

    pub fn to_self(mut self) -> Self {
        self.to = Some(TargetRef::Declaring);
        self
    }

    /// Add a guard, evaluated after the event's guards and any added earlier.
    pub fn guard(mut self, guard: impl Into<Condition<H>>) -> Self {
        self.guards.push(guard.into());
        self
    }

    pub fn action(mut self, action: impl Into<Callback<H>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Attach a comment. Repeated comments are kept on separate lines.
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.comment = Some(match self.comment.take() {
            Some(existing) => format!("{existing}\n{text}"),
            None => text,
        });
        self
    }
}

impl<H: Host> Default for TransitionBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Clone for TransitionBuilder<H> {
    fn clone(&self) -> Self {
        Self {
            to: self.to.clone(),
            guards: self.guards.clone(),
            action: self.action.clone(),
            comment: self.comment.clone(),
        }
    }
}

/// Declarations made for one event on one state.
///
/// A block without nested transitions stands for a single transition built
/// from the block's own target, guards and action. Otherwise the block's
/// guards are prepended to each nested transition, its action fills in for
/// transitions without one, and its target is the default for transitions
/// without one.
pub struct EventBuilder<H: Host> {
    pub(crate) to: Option<TargetRef>,
    pub(crate) guards: Vec<Condition<H>>,
    pub(crate) action: Option<Callback<H>>,
    pub(crate) transitions: Vec<TransitionBuilder<H>>,
}

impl<H: Host> EventBuilder<H> {
    pub fn new() -> Self {
        Self {
            to: None,
            guards: Vec::new(),
            action: None,
            transitions: Vec::new(),
        }
    }

    /// Target state. `"self"` names the declaring state.
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(TargetRef::from_name(state.into()));
        self
    }

    pub fn to_self(mut self) -> Self {
        self.to = Some(TargetRef::Declaring);
        self
    }

    /// Add a guard shared by every transition of this block.
    pub fn guard(mut self, guard: impl Into<Condition<H>>) -> Self {
        self.guards.push(guard.into());
        self
    }

    pub fn action(mut self, action: impl Into<Callback<H>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Declare a candidate transition. Candidates are tried in declaration order.
    pub fn transition(
        mut self,
        define: impl FnOnce(TransitionBuilder<H>) -> TransitionBuilder<H>,
    ) -> Self {
        self.transitions.push(define(TransitionBuilder::new()));
        self
    }

    /// Flatten the block into its transitions, with event-level options
    /// applied. Targets stay unresolved.
    pub(crate) fn into_transitions(self) -> Vec<TransitionBuilder<H>> {
        let Self {
            to,
            guards,
            action,
            transitions,
        } = self;

        let declared = if transitions.is_empty() {
            vec![TransitionBuilder::new()]
        } else {
            transitions
        };

        declared
            .into_iter()
            .map(|transition| TransitionBuilder {
                to: transition.to.or_else(|| to.clone()),
                guards: guards.iter().cloned().chain(transition.guards).collect(),
                action: transition.action.or_else(|| action.clone()),
                comment: transition.comment,
            })
            .collect()
    }
}

impl<H: Host> Default for EventBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Clone for EventBuilder<H> {
    fn clone(&self) -> Self {
        Self {
            to: self.to.clone(),
            guards: self.guards.clone(),
            action: self.action.clone(),
            transitions: self.transitions.clone(),
        }
    }
}
