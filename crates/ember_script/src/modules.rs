//! Built-in module table
//!
//! Modules registered here can be bound into any namespace with `import`.
//! The table is closed once the interpreter starts.

use crate::error::LifecycleError;
use ember_core::OwnerId;
use rquickjs::convert::Coerced;
use rquickjs::{Ctx, Function, Object};
use std::fmt;

/// Builds a module object inside one owner's namespace.
pub type ModuleBuilder = for<'js> fn(&Ctx<'js>, &OwnerId) -> rquickjs::Result<Object<'js>>;

/// Name of the stock module registered at interpreter start.
pub const HOST_MODULE: &str = "ember";

#[derive(Clone, Copy)]
pub struct BuiltinModule {
    pub name: &'static str,
    pub build: ModuleBuilder,
}

impl fmt::Debug for BuiltinModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinModule").field("name", &self.name).finish_non_exhaustive()
    }
}

impl BuiltinModule {
    pub const fn new(name: &'static str, build: ModuleBuilder) -> Self {
        Self { name, build }
    }
}

#[derive(Debug, Default)]
pub struct ModuleTable {
    modules: Vec<BuiltinModule>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: BuiltinModule) -> Result<(), LifecycleError> {
        if self.get(module.name).is_some() {
            return Err(LifecycleError::ModuleRegistration {
                name: module.name.to_string(),
            });
        }
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinModule> {
        self.modules.iter().find(|module| module.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|module| module.name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The `ember` module: owner identity plus logging into the host console.
pub fn host_module() -> BuiltinModule {
    BuiltinModule::new(HOST_MODULE, build_host_module)
}

fn build_host_module<'js>(ctx: &Ctx<'js>, owner: &OwnerId) -> rquickjs::Result<Object<'js>> {
    let module = Object::new(ctx.clone())?;
    module.set("name", owner.as_str())?;
    module.set("version", ember_core::VERSION)?;

    let id = owner.clone();
    let post = Function::new(ctx.clone(), move |msg: Coerced<String>| {
        tracing::info!(target: "ember::script", owner = %id, "{}", msg.0);
    })?;
    module.set("post", post)?;

    let id = owner.clone();
    let error = Function::new(ctx.clone(), move |msg: Coerced<String>| {
        tracing::error!(target: "ember::script", owner = %id, "{}", msg.0);
    })?;
    module.set("error", error)?;

    Ok(module)
}
