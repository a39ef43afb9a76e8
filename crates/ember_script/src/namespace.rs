//! Per-owner namespaces
//!
//! Every owner gets its own context on the shared runtime. Contexts have
//! separate global objects, so bindings made by one owner are invisible to
//! every other owner while the heap and the garbage collector stay shared.

use ember_core::OwnerId;
use rquickjs::convert::Coerced;
use rquickjs::{Context, Ctx, Function, Runtime};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

// Identities are unique for the whole process, not per registry.
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Allocates namespaces and hands out their identities.
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    live: Rc<Cell<usize>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh namespace on `runtime` with the standard globals bound.
    pub fn create(&self, runtime: &Runtime) -> rquickjs::Result<Namespace> {
        let identity = next_identity();
        let context = Context::full(runtime)?;
        context.with(|ctx| install_prelude(&ctx, &identity))?;

        self.live.set(self.live.get() + 1);
        tracing::debug!(owner = %identity, "namespace created");

        Ok(Namespace {
            identity,
            context,
            live: Rc::clone(&self.live),
        })
    }

    /// Number of namespaces that have not been dropped yet.
    pub fn live(&self) -> usize {
        self.live.get()
    }
}

fn next_identity() -> OwnerId {
    let n = NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed);
    OwnerId::new(format!("u{n:06}"))
}

fn install_prelude(ctx: &Ctx<'_>, owner: &OwnerId) -> rquickjs::Result<()> {
    let id = owner.clone();
    let print = Function::new(ctx.clone(), move |msg: Coerced<String>| {
        tracing::info!(target: "ember::script", owner = %id, "{}", msg.0);
    })?;
    ctx.globals().set("print", print)
}

/// An owner's isolated scope inside the shared interpreter.
///
/// Dropping the namespace releases its context. It must be dropped before
/// the owner's lease on the interpreter is released.
pub struct Namespace {
    identity: OwnerId,
    context: Context,
    live: Rc<Cell<usize>>,
}

impl Namespace {
    pub fn identity(&self) -> &OwnerId {
        &self.identity
    }

    /// Run `f` with this namespace's context entered.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        self.context.with(f)
    }
}

impl Drop for Namespace {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
        tracing::debug!(owner = %self.identity, "namespace released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_never_repeat() {
        let runtime = Runtime::new().unwrap();
        let registry = NamespaceRegistry::new();
        let other_registry = NamespaceRegistry::new();

        let a = registry.create(&runtime).unwrap();
        let b = registry.create(&runtime).unwrap();
        let c = other_registry.create(&runtime).unwrap();

        assert_ne!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_ne!(b.identity(), c.identity());
    }

    #[test]
    fn live_count_follows_drops() {
        let runtime = Runtime::new().unwrap();
        let registry = NamespaceRegistry::new();

        let a = registry.create(&runtime).unwrap();
        let b = registry.create(&runtime).unwrap();
        assert_eq!(registry.live(), 2);

        drop(a);
        assert_eq!(registry.live(), 1);
        drop(b);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn globals_are_isolated_with_builtins_bound() {
        let runtime = Runtime::new().unwrap();
        let registry = NamespaceRegistry::new();
        let a = registry.create(&runtime).unwrap();
        let b = registry.create(&runtime).unwrap();

        a.with(|ctx| ctx.globals().set("shared", 7)).unwrap();

        let in_b: bool = b.with(|ctx| ctx.globals().contains_key("shared")).unwrap();
        assert!(!in_b);

        let max: i32 = b.with(|ctx| ctx.eval("Math.max(1, 9)")).unwrap();
        assert_eq!(max, 9);

        let has_print: bool = a.with(|ctx| ctx.eval("typeof print === 'function'")).unwrap();
        assert!(has_print);
    }
}
