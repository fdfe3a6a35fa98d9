//! Guarded edges between states.

use super::callback::Callback;
use super::guard::Condition;
use super::state::StateId;
use crate::host::{Host, HostError};
use std::fmt;

/// An edge from one state to another.
///
/// Eligible only when every guard passes; guards are evaluated in order and
/// the first failure stops evaluation.
pub struct Transition<H: Host> {
    from: StateId,
    to: StateId,
    pub(crate) guards: Vec<Condition<H>>,
    pub(crate) action: Option<Callback<H>>,
    pub(crate) comment: Option<String>,
}

impl<H: Host> Transition<H> {
    pub(crate) fn new(from: StateId, to: StateId) -> Self {
        Self {
            from,
            to,
            guards: Vec::new(),
            action: None,
            comment: None,
        }
    }

    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn is_self_transition(&self) -> bool {
        self.from == self.to
    }

    pub fn guards(&self) -> &[Condition<H>] {
        &self.guards
    }

    pub fn action(&self) -> Option<&Callback<H>> {
        self.action.as_ref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// First guard that rejects the host, or `None` if the transition is eligible.
    pub fn first_failing_guard(
        &self,
        host: &H,
        args: &[H::Arg],
    ) -> Result<Option<&Condition<H>>, HostError> {
        for guard in &self.guards {
            if !guard.evaluate(host, args)? {
                return Ok(Some(guard));
            }
        }
        Ok(None)
    }

    /// Check if every guard passes (pure).
    pub fn can_execute(&self, host: &H, args: &[H::Arg]) -> Result<bool, HostError> {
        Ok(self.first_failing_guard(host, args)?.is_none())
    }
}

impl<H: Host> fmt::Debug for Transition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guards", &self.guards)
            .field("action", &self.action)
            .field("comment", &self.comment)
            .finish()
    }
}
