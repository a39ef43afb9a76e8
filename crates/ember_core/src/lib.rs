//! Ember Core
//!
//! Shared vocabulary of the scripting bridge:
//! - Protocol atoms and the flat, scalar-only reply values
//! - Value classification (dynamic value -> protocol atoms)
//! - Protocol messages as they arrive from the host
//! - Diagnostics and owner identities

pub mod atom;
pub mod codec;
pub mod diagnostic;
pub mod message;

pub use atom::{Atom, AtomList, ProtocolValue, INLINE_ATOMS};
pub use codec::DynamicValue;
pub use diagnostic::{Diagnostic, OwnerId};
pub use message::Message;

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
