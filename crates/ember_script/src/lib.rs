//! Ember Scripting System
//!
//! JavaScript execution via an embedded QuickJS runtime shared by every owner
//!
//! ## Architecture
//!
//! - **Lifecycle:** one runtime per process, started by the first owner and
//!   finalized when the last one leaves
//! - **Namespaces:** one context per owner, each with its own globals
//! - **FFI:** interpreter values are lifted into plain Rust values before
//!   they are encoded into protocol atoms
//! - **Faults:** every interpreter call ends in a fault capture that yields a
//!   [`ember_core::Diagnostic`] on failure

pub mod error;
pub mod fault;
pub mod ffi;
pub mod modules;
pub mod namespace;
pub mod runner;
pub mod runtime;

pub use error::LifecycleError;
pub use fault::{FaultTranslator, Operation};
pub use modules::{BuiltinModule, ModuleTable, HOST_MODULE};
pub use namespace::{Namespace, NamespaceRegistry};
pub use runner::{ExecutionRequest, ScriptRunner};
pub use runtime::{InterpreterState, Lifecycle, OwnerLease};

pub use rquickjs;
