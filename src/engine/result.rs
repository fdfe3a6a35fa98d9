//! Outcomes of firing an event.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of firing an event on a single machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringResult {
    /// A transition was taken; carries the new state name.
    Transitioned(String),

    /// No eligible transition; carries the reasons in the order encountered.
    Rejected(Vec<String>),
}

impl FiringResult {
    /// True for [`FiringResult::Transitioned`].
    pub fn is_transitioned(&self) -> bool {
        matches!(self, Self::Transitioned(_))
    }

    /// New state name, if the event was accepted.
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Transitioned(state) => Some(state),
            Self::Rejected(_) => None,
        }
    }

    /// Rejection reasons, empty after a transition.
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Transitioned(_) => &[],
            Self::Rejected(reasons) => reasons,
        }
    }
}

/// A transition taken by one machine during a dispatched event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transitioned {
    pub machine: String,
    pub state: String,
}

/// Rejection of an event no machine could accept.
///
/// Carries the same content whether it is returned as a value or raised as
/// an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ImpossibleEvent {
    pub message: String,
    pub events: Vec<String>,
    pub hosts: Vec<String>,
    pub reasons: Vec<String>,
}

impl ImpossibleEvent {
    /// Rejection of `event` by one machine on `host`.
    pub fn new(host: impl Into<String>, event: impl Into<String>, reasons: Vec<String>) -> Self {
        let host = host.into();
        let event = event.into();
        let message = if reasons.is_empty() {
            format!("{host} cannot currently accept the event '{event}'")
        } else {
            format!(
                "{host} cannot currently accept the event '{event}' because {}",
                reasons.join("; ")
            )
        };
        Self {
            message,
            events: vec![event],
            hosts: vec![host],
            reasons,
        }
    }

    /// Merge the rejections of several machines into one.
    ///
    /// Messages are joined line by line; events, hosts and reasons are
    /// deduplicated, keeping first-seen order.
    pub fn combine(rejections: impl IntoIterator<Item = ImpossibleEvent>) -> Self {
        let mut messages: Vec<String> = Vec::new();
        let mut combined = Self::default();

        for rejection in rejections {
            push_unique(&mut messages, rejection.message);
            for event in rejection.events {
                push_unique(&mut combined.events, event);
            }
            for host in rejection.hosts {
                push_unique(&mut combined.hosts, host);
            }
            for reason in rejection.reasons {
                push_unique(&mut combined.reasons, reason);
            }
        }

        combined.message = messages.join("\n");
        combined
    }

    /// One-line summary, e.g. `'WAKE UP' for Monster failed`.
    pub fn human_explanation(&self) -> String {
        let events: Vec<String> = self
            .events
            .iter()
            .map(|event| event.replace('_', " ").to_uppercase())
            .collect();
        format!("'{}' for {} failed", events.join("/"), self.hosts.join("/"))
    }

    /// Reasons in the order they were encountered.
    pub fn human_reasons(&self) -> &[String] {
        &self.reasons
    }
}

pub(crate) fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}
