//! Bridge object
//!
//! Binds one host object to one namespace for its whole lifetime and maps
//! protocol messages onto script operations.

use crate::deferral::{DeferralQueue, DeferredTask};
use crate::outlet::{Channel, Output, Outlets};
use ember_core::{Atom, Diagnostic, Message, OwnerId, ProtocolValue};
use ember_script::{ExecutionRequest, Lifecycle, LifecycleError, Namespace, OwnerLease, ScriptRunner};
use ember_services::{read_text, FileLocator, OwnerSettings, TextBuffer};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Host services an owner needs while handling a message.
pub struct HostContext<'a> {
    pub outlets: &'a mut dyn Outlets,
    pub deferred: &'a mut DeferralQueue,
    pub files: &'a dyn FileLocator,
}

pub struct BridgeObject {
    settings: OwnerSettings,
    code: TextBuffer,
    // Field order matters: the namespace is dropped before the lease releases
    // the interpreter.
    namespace: Namespace,
    lease: OwnerLease,
}

impl BridgeObject {
    /// Create an owner, starting the interpreter if this is the first one.
    pub fn new(lifecycle: &Rc<Lifecycle>, settings: OwnerSettings) -> Result<Self, LifecycleError> {
        let lease = OwnerLease::acquire(lifecycle)?;
        let namespace = lifecycle.create_namespace()?;
        let object = Self {
            settings,
            code: TextBuffer::new(),
            namespace,
            lease,
        };
        object.log(format_args!("object created"));
        Ok(object)
    }

    pub fn identity(&self) -> &OwnerId {
        self.namespace.identity()
    }

    /// Name shown in logs: the configured name, else the identity.
    pub fn label(&self) -> &str {
        self.settings
            .name
            .as_deref()
            .unwrap_or_else(|| self.identity().as_str())
    }

    pub fn settings(&self) -> &OwnerSettings {
        &self.settings
    }

    pub fn code(&self) -> &TextBuffer {
        &self.code
    }

    pub fn handle(&mut self, message: &Message, host: &mut HostContext<'_>) {
        self.log(format_args!("{message}"));

        let outcome = match message.selector() {
            "bang" => self
                .no_args(message)
                .map(|()| self.emit(host, Channel::Reply, Output::Bang)),
            "count" => self.no_args(message).map(|()| {
                let count = self.lease.lifecycle().active_owner_count() as i64;
                self.emit(host, Channel::Reply, Output::Value(ProtocolValue::Scalar(Atom::Int(count))))
            }),
            "import" => self
                .symbol_arg(message)
                .and_then(|name| self.import(&name, host)),
            "eval" => self
                .source_arg(message)
                .and_then(|source| self.execute(ExecutionRequest::Eval(source), host)),
            "exec" => self
                .source_arg(message)
                .and_then(|source| self.execute(ExecutionRequest::Exec(source), host)),
            "execfile" => self
                .symbol_arg(message)
                .and_then(|path| self.execute(ExecutionRequest::ExecFile(PathBuf::from(path)), host)),
            "load" => self
                .symbol_arg(message)
                .map(|name| host.deferred.schedule(self.identity(), DeferredTask::Load { name })),
            "read" => self
                .optional_symbol_arg(message)
                .map(|name| host.deferred.schedule(self.identity(), DeferredTask::Read { name })),
            _ => Err(self.protocol_fault(message, "no method for message")),
        };

        if let Err(diagnostic) = outcome {
            self.report(diagnostic, host);
        }
    }

    /// Run work that was deferred to a scheduling turn.
    pub fn run_deferred(&mut self, task: DeferredTask, host: &mut HostContext<'_>) {
        let outcome = match task {
            DeferredTask::Read { name } => self.read(name, host.files).map(|_| ()),
            DeferredTask::Load { name } => self
                .read(Some(name), host.files)
                .and_then(|path| self.execute(ExecutionRequest::ExecFile(path), host)),
        };

        if let Err(diagnostic) = outcome {
            self.report(diagnostic, host);
        }
    }

    /// The editor closed: keep its text.
    pub fn editor_closed(&mut self, text: &[u8]) {
        self.code.set_text(text);
    }

    /// The editor saved: keep its text and run it.
    pub fn editor_saved(&mut self, text: &[u8], host: &mut HostContext<'_>) {
        self.code.set_text(text);

        let name = self
            .settings
            .file
            .as_ref()
            .map(|file| file.display().to_string())
            .unwrap_or_default();
        self.log(format_args!("running editor code {name}"));

        let source = self.code.to_source();
        if let Err(diagnostic) = ScriptRunner::new(&self.namespace).exec_buffer(&name, &source) {
            self.report(diagnostic, host);
        }
    }

    fn execute(&self, request: ExecutionRequest, host: &mut HostContext<'_>) -> Result<(), Diagnostic> {
        let reply = ScriptRunner::new(&self.namespace).run(&request)?;
        if let Some(value) = reply {
            self.emit(host, Channel::Reply, Output::Value(value));
        }
        self.emit(host, Channel::Signal, Output::Bang);
        Ok(())
    }

    fn import(&self, name: &str, host: &mut HostContext<'_>) -> Result<(), Diagnostic> {
        let modules = self.lease.lifecycle().modules();
        ScriptRunner::new(&self.namespace).import(&modules, name)?;
        self.emit(host, Channel::Signal, Output::Bang);
        self.log(format_args!("imported: {name}"));
        Ok(())
    }

    fn read(&mut self, name: Option<String>, files: &dyn FileLocator) -> Result<PathBuf, Diagnostic> {
        let name = match name.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => match &self.settings.file {
                Some(file) => file.display().to_string(),
                None => return Err(Diagnostic::new(self.identity(), "read", "", "no file to read")),
            },
        };

        let path = files
            .locate(&name)
            .map_err(|err| Diagnostic::new(self.identity(), "read", &name, err.to_string()))?;
        let text = read_text(&path)
            .map_err(|err| Diagnostic::new(self.identity(), "read", &name, err.to_string()))?;

        // Only a successful read changes the owner.
        self.settings.file = Some(PathBuf::from(name));
        self.code.set_text(&text);
        self.log(format_args!("read {} ({} bytes)", path.display(), text.len()));
        Ok(path)
    }

    fn no_args(&self, message: &Message) -> Result<(), Diagnostic> {
        if message.args().is_empty() {
            Ok(())
        } else {
            Err(self.protocol_fault(message, "unexpected arguments"))
        }
    }

    fn symbol_arg(&self, message: &Message) -> Result<String, Diagnostic> {
        match self.optional_symbol_arg(message)? {
            Some(symbol) => Ok(symbol),
            None => Err(self.protocol_fault(message, "missing argument")),
        }
    }

    fn optional_symbol_arg(&self, message: &Message) -> Result<Option<String>, Diagnostic> {
        match message.args() {
            [] => Ok(None),
            [Atom::Symbol(symbol)] => Ok(Some(symbol.clone())),
            [other] => Err(self.protocol_fault(message, format!("expected a symbol, got '{other}'"))),
            _ => Err(self.protocol_fault(message, "too many arguments")),
        }
    }

    fn source_arg(&self, message: &Message) -> Result<String, Diagnostic> {
        if message.args().is_empty() {
            return Err(self.protocol_fault(message, "missing argument"));
        }
        Ok(message.source().to_string())
    }

    fn protocol_fault(&self, message: &Message, text: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.identity(), message.selector(), "", text)
    }

    fn emit(&self, host: &mut HostContext<'_>, channel: Channel, output: Output) {
        host.outlets.emit(self.identity(), channel, output);
    }

    fn report(&self, diagnostic: Diagnostic, host: &mut HostContext<'_>) {
        tracing::error!(owner = %self.label(), "{diagnostic}");
        if let Some(traceback) = diagnostic.traceback.as_deref().filter(|_| self.settings.debug) {
            tracing::debug!(owner = %self.label(), "{traceback}");
        }
        host.outlets.report(diagnostic);
    }

    fn log(&self, args: fmt::Arguments<'_>) {
        if self.settings.debug {
            tracing::info!(owner = %self.label(), "{args}");
        }
    }
}

impl Drop for BridgeObject {
    fn drop(&mut self) {
        self.log(format_args!("will be deleted"));
    }
}
