//! Script runtime management
//!
//! One interpreter runtime is shared by every owner in the process. The
//! [`Lifecycle`] starts it on the first [`OwnerLease`] and finalizes it when
//! the last lease is dropped:
//!
//! ```text
//! Uninitialized --first acquire--> Ready --last release--> Finalized
//! ```
//!
//! Finalized is terminal: once the last owner is gone, scripting cannot be
//! restarted in the same process.

use crate::error::LifecycleError;
use crate::modules::{host_module, BuiltinModule, ModuleTable};
use crate::namespace::{Namespace, NamespaceRegistry};
use ember_services::InterpreterSettings;
use rquickjs::Runtime;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    Uninitialized,
    Ready,
    Finalized,
}

/// Process-wide interpreter state, shared by reference with every owner.
///
/// Shared through `Rc`, so it never leaves the host thread that created it
/// and the owner count needs no synchronization.
pub struct Lifecycle {
    settings: InterpreterSettings,
    state: Cell<InterpreterState>,
    active: Cell<usize>,
    modules: RefCell<ModuleTable>,
    runtime: RefCell<Option<Runtime>>,
    namespaces: NamespaceRegistry,
}

impl Lifecycle {
    pub fn new(settings: InterpreterSettings) -> Self {
        Self {
            settings,
            state: Cell::new(InterpreterState::Uninitialized),
            active: Cell::new(0),
            modules: RefCell::new(ModuleTable::new()),
            runtime: RefCell::new(None),
            namespaces: NamespaceRegistry::new(),
        }
    }

    pub fn state(&self) -> InterpreterState {
        self.state.get()
    }

    pub fn active_owner_count(&self) -> usize {
        self.active.get()
    }

    pub fn live_namespaces(&self) -> usize {
        self.namespaces.live()
    }

    pub fn modules(&self) -> Ref<'_, ModuleTable> {
        self.modules.borrow()
    }

    /// Add a built-in module. Only allowed before the interpreter starts.
    pub fn register_module(&self, module: BuiltinModule) -> Result<(), LifecycleError> {
        if self.state.get() != InterpreterState::Uninitialized {
            return Err(LifecycleError::RegistrationClosed {
                name: module.name.to_string(),
            });
        }
        self.modules.borrow_mut().register(module)
    }

    /// Take one owner reference, starting the interpreter on the first one.
    ///
    /// An error from the very first acquire means the interpreter could not
    /// start at all; the host should treat it as fatal.
    pub fn acquire(&self) -> Result<(), LifecycleError> {
        match self.state.get() {
            InterpreterState::Finalized => return Err(LifecycleError::Finalized),
            InterpreterState::Uninitialized => self.initialize()?,
            InterpreterState::Ready => {}
        }
        let count = self.active.get() + 1;
        self.active.set(count);
        tracing::trace!(active = count, "interpreter acquired");
        Ok(())
    }

    /// Drop one owner reference, finalizing the interpreter on the last one.
    pub fn release(&self) {
        match self.active.get().checked_sub(1) {
            Some(0) => {
                self.active.set(0);
                self.finalize();
            }
            Some(remaining) => {
                self.active.set(remaining);
                tracing::trace!(active = remaining, "interpreter released");
            }
            None => tracing::warn!("interpreter released without a matching acquire"),
        }
    }

    /// Allocate a namespace for a new owner.
    pub fn create_namespace(&self) -> Result<Namespace, LifecycleError> {
        let runtime = self.runtime.borrow();
        let runtime = runtime.as_ref().ok_or(LifecycleError::NotReady)?;
        Ok(self.namespaces.create(runtime)?)
    }

    fn initialize(&self) -> Result<(), LifecycleError> {
        self.modules.borrow_mut().register(host_module())?;

        let runtime = Runtime::new()?;
        if let Some(limit) = self.settings.memory_limit {
            runtime.set_memory_limit(limit);
        }
        if let Some(limit) = self.settings.max_stack_size {
            runtime.set_max_stack_size(limit);
        }
        if let Some(threshold) = self.settings.gc_threshold {
            runtime.set_gc_threshold(threshold);
        }

        *self.runtime.borrow_mut() = Some(runtime);
        self.state.set(InterpreterState::Ready);
        tracing::info!(modules = self.modules.borrow().len(), "interpreter initialized");
        Ok(())
    }

    fn finalize(&self) {
        if let Some(runtime) = self.runtime.borrow_mut().take() {
            runtime.run_gc();
        }
        self.state.set(InterpreterState::Finalized);
        tracing::info!("last owner released, interpreter finalized");
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(InterpreterSettings::default())
    }
}

/// One owner's reference on the interpreter; released on drop.
pub struct OwnerLease {
    lifecycle: Rc<Lifecycle>,
}

impl OwnerLease {
    pub fn acquire(lifecycle: &Rc<Lifecycle>) -> Result<Self, LifecycleError> {
        lifecycle.acquire()?;
        Ok(Self {
            lifecycle: Rc::clone(lifecycle),
        })
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}

impl Drop for OwnerLease {
    fn drop(&mut self) {
        self.lifecycle.release();
    }
}
