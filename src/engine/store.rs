//! Where a machine keeps a host's current state.

use crate::host::Host;
use std::fmt;

type Reader<H> = Box<dyn Fn(&H) -> Option<String>>;
type Writer<H> = Box<dyn Fn(&mut H, &str)>;

/// Current-state storage for one machine on its host type.
pub(crate) enum StateStore<H: Host> {
    /// Stored by the host under a named attribute.
    Attribute(String),
    /// Custom accessor pair, bypassing attribute storage.
    Accessor { read: Reader<H>, write: Writer<H> },
}

impl<H: Host> StateStore<H> {
    /// Attribute used when none is configured: `state` for the default
    /// machine, `<name>_state` for a named one.
    pub(crate) fn default_for(machine: Option<&str>) -> Self {
        match machine {
            None => Self::Attribute("state".to_string()),
            Some(name) => Self::Attribute(format!("{name}_state")),
        }
    }

    pub(crate) fn accessor<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&H) -> Option<String> + 'static,
        W: Fn(&mut H, &str) + 'static,
    {
        Self::Accessor {
            read: Box::new(read),
            write: Box::new(write),
        }
    }

    pub(crate) fn read(&self, host: &H) -> Option<String> {
        match self {
            Self::Attribute(attribute) => host.read_state(attribute),
            Self::Accessor { read, .. } => read(host),
        }
    }

    pub(crate) fn write(&self, host: &mut H, state: &str) {
        match self {
            Self::Attribute(attribute) => host.write_state(attribute, state),
            Self::Accessor { write, .. } => write(host, state),
        }
    }

    pub(crate) fn attribute(&self) -> Option<&str> {
        match self {
            Self::Attribute(attribute) => Some(attribute),
            Self::Accessor { .. } => None,
        }
    }
}

impl<H: Host> fmt::Debug for StateStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(attribute) => f.debug_tuple("Attribute").field(attribute).finish(),
            Self::Accessor { .. } => f.write_str("Accessor"),
        }
    }
}
