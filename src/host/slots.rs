//! In-memory current-state storage for hosts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current-state values keyed by state attribute.
///
/// One slot per machine attached to the host. Serializable so a host can
/// persist its states alongside its own fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSlots {
    slots: BTreeMap<String, String>,
}

impl StateSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.slots.get(attribute).map(String::as_str)
    }

    pub fn set(&mut self, attribute: &str, state: &str) {
        self.slots.insert(attribute.to_string(), state.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
