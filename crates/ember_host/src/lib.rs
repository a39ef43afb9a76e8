//! Ember Host
//!
//! The host-side half of the bridge: owner objects, their outlets and the
//! deferred work queue drained once per scheduling turn.

pub mod bridge;
pub mod deferral;
pub mod host;
pub mod outlet;

pub use bridge::{BridgeObject, HostContext};
pub use deferral::{DeferralQueue, DeferredTask};
pub use host::Host;
pub use outlet::{Channel, Output, Outlets};
