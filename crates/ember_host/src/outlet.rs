//! Owner outputs
//!
//! Each owner has two outlets: `Signal` carries completion bangs, `Reply`
//! carries values. Diagnostics travel on their own report stream.

use ember_core::{Diagnostic, OwnerId, ProtocolValue};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Outlet 0: completion signal.
    Signal,
    /// Outlet 1: replies.
    Reply,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Bang,
    Value(ProtocolValue),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Bang => f.write_str("bang"),
            Output::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Sink for everything owners send back to the host.
pub trait Outlets {
    fn emit(&mut self, owner: &OwnerId, channel: Channel, output: Output);
    fn report(&mut self, diagnostic: Diagnostic);
}

#[cfg(test)]
pub(crate) use recorder::{Emission, Recorder};
