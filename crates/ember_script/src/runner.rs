//! Script execution against one owner's namespace
//!
//! Three modes:
//! - `eval`: a single expression; its value is classified into atoms
//! - `exec`: statements run directly on the namespace globals, so
//!   definitions persist between calls
//! - `exec_file`: a whole file run like `exec`
//!
//! Every interpreter call is followed by exactly one fault capture.

use crate::fault::{FaultTranslator, Operation};
use crate::ffi::lift;
use crate::modules::ModuleTable;
use crate::namespace::Namespace;
use ember_core::codec::encode;
use ember_core::{Diagnostic, ProtocolValue};
use ember_services::read_text;
use rquickjs::context::EvalOptions;
use rquickjs::{Exception, Value};
use std::path::{Path, PathBuf};

/// A unit of work for one owner's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionRequest {
    Eval(String),
    Exec(String),
    ExecFile(PathBuf),
}

pub struct ScriptRunner<'a> {
    namespace: &'a Namespace,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Self { namespace }
    }

    /// Run a request; only `Eval` can produce a value.
    pub fn run(&self, request: &ExecutionRequest) -> Result<Option<ProtocolValue>, Diagnostic> {
        match request {
            ExecutionRequest::Eval(source) => self.eval(source),
            ExecutionRequest::Exec(source) => self.exec(source).map(|()| None),
            ExecutionRequest::ExecFile(path) => self.exec_file(path).map(|()| None),
        }
    }

    /// Evaluate one expression. `Ok(None)` means it produced a value with no
    /// protocol form.
    pub fn eval(&self, source: &str) -> Result<Option<ProtocolValue>, Diagnostic> {
        let operation = Operation::new("eval", source);
        self.require_source(operation, source)?;

        // Parenthesized so only an expression parses; it never declares globals.
        let expression = format!("(\n{source}\n)");
        let lifted = self.namespace.with(|ctx| {
            let outcome = ctx
                .eval::<Value, _>(expression)
                .and_then(|value| lift(&ctx, &value));
            self.faults().capture(&ctx, operation, outcome)
        })?;
        Ok(encode(&lifted))
    }

    /// Run statements against the namespace globals.
    pub fn exec(&self, source: &str) -> Result<(), Diagnostic> {
        self.run_statements(Operation::new("exec", source), source.as_bytes())
    }

    /// Run editor text the same way as `exec`, reported under its own label.
    pub fn exec_buffer(&self, name: &str, source: &str) -> Result<(), Diagnostic> {
        self.run_statements(Operation::new("edsave", name), source.as_bytes())
    }

    /// Read a file and run its contents against the namespace globals.
    pub fn exec_file(&self, path: &Path) -> Result<(), Diagnostic> {
        let subject = path.display().to_string();
        let operation = Operation::new("execfile", &subject);
        if path.as_os_str().is_empty() {
            return Err(operation.diagnostic(self.owner(), "missing filepath"));
        }

        let source = read_text(path).map_err(|err| operation.diagnostic(self.owner(), err.to_string()))?;
        self.run_statements(operation, &source)
    }

    /// Bind a built-in module into the namespace under its own name.
    pub fn import(&self, modules: &ModuleTable, name: &str) -> Result<(), Diagnostic> {
        let operation = Operation::new("import", name);
        self.require_source(operation, name)?;

        let owner = self.owner();
        self.namespace.with(|ctx| {
            let outcome = match modules.get(name) {
                Some(module) => (module.build)(&ctx, owner).and_then(|object| ctx.globals().set(name, object)),
                None => Err(Exception::throw_reference(&ctx, &format!("no module named '{name}'"))),
            };
            self.faults().capture(&ctx, operation, outcome)
        })
    }

    fn run_statements(&self, operation: Operation<'_>, source: &[u8]) -> Result<(), Diagnostic> {
        if source.iter().all(u8::is_ascii_whitespace) {
            return Err(operation.diagnostic(self.owner(), "missing source text"));
        }

        self.namespace.with(|ctx| {
            let outcome = ctx.eval_with_options::<(), _>(source.to_vec(), sloppy_global());
            self.faults().capture(&ctx, operation, outcome)
        })
    }

    fn require_source(&self, operation: Operation<'_>, source: &str) -> Result<(), Diagnostic> {
        if source.trim().is_empty() {
            return Err(operation.diagnostic(self.owner(), "missing source text"));
        }
        Ok(())
    }

    fn owner(&self) -> &'a ember_core::OwnerId {
        self.namespace.identity()
    }

    fn faults(&self) -> FaultTranslator<'a> {
        FaultTranslator::new(self.owner())
    }
}

// Non-strict so plain assignments create globals that later calls can see.
fn sloppy_global() -> EvalOptions {
    let mut options = EvalOptions::default();
    options.global = true;
    options.strict = false;
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::HOST_MODULE;
    use crate::runtime::{Lifecycle, OwnerLease};
    use ember_core::Atom;
    use std::rc::Rc;

    struct Owner {
        namespace: Namespace,
        _lease: OwnerLease,
    }

    impl Owner {
        fn new(lifecycle: &Rc<Lifecycle>) -> Self {
            let lease = OwnerLease::acquire(lifecycle).unwrap();
            Self {
                namespace: lifecycle.create_namespace().unwrap(),
                _lease: lease,
            }
        }

        fn runner(&self) -> ScriptRunner<'_> {
            ScriptRunner::new(&self.namespace)
        }
    }

    #[test]
    fn eval_classifies_results() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);
        let runner = owner.runner();

        assert_eq!(
            runner.eval("1+1").unwrap(),
            Some(ProtocolValue::Scalar(Atom::Int(2)))
        );
        assert_eq!(
            runner.eval("'hel' + 'lo'").unwrap(),
            Some(ProtocolValue::Scalar(Atom::symbol("hello")))
        );
        assert_eq!(runner.eval("null").unwrap(), None);
        assert_eq!(
            runner.eval("10n").unwrap(),
            Some(ProtocolValue::Scalar(Atom::Int(10)))
        );

        let list = runner.eval("[1, 'two', [3], 4.5]").unwrap().unwrap();
        assert_eq!(
            list.as_list(),
            Some(&[Atom::Int(1), Atom::symbol("two"), Atom::Float(4.5)][..])
        );
    }

    #[test]
    fn eval_of_long_list_spills_transparently() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);

        let Some(ProtocolValue::List(atoms)) = owner
            .runner()
            .eval("Array.from({ length: 300 }, (_, i) => i)")
            .unwrap()
        else {
            panic!("expected a list");
        };
        assert_eq!(atoms.len(), 300);
        assert!(atoms.iter().enumerate().all(|(i, atom)| *atom == Atom::Int(i as i64)));
    }

    #[test]
    fn eval_faults_become_diagnostics() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);

        let diagnostic = owner.runner().eval("undefined_name").unwrap_err();
        assert_eq!(diagnostic.operation, "eval");
        assert_eq!(&diagnostic.owner, owner.namespace.identity());
        assert!(!diagnostic.message.is_empty());

        // Statements are not expressions.
        assert!(owner.runner().eval("var y = 1").is_err());
    }

    #[test]
    fn empty_source_never_reaches_the_interpreter() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);
        let runner = owner.runner();

        assert_eq!(runner.eval("").unwrap_err().message, "missing source text");
        assert_eq!(runner.exec("  \n").unwrap_err().message, "missing source text");
        assert_eq!(
            runner.exec_file(Path::new("")).unwrap_err().message,
            "missing filepath"
        );
    }

    #[test]
    fn exec_definitions_persist_per_namespace() {
        let lifecycle = Rc::new(Lifecycle::default());
        let a = Owner::new(&lifecycle);
        let b = Owner::new(&lifecycle);

        a.runner().exec("x = 5").unwrap();
        a.runner().exec("function twice(n) { return n * 2 }").unwrap();
        assert_eq!(a.runner().eval("x").unwrap(), Some(ProtocolValue::Scalar(Atom::Int(5))));
        assert_eq!(
            a.runner().eval("twice(x)").unwrap(),
            Some(ProtocolValue::Scalar(Atom::Int(10)))
        );

        let missing = b.runner().eval("x").unwrap_err();
        assert!(missing.message.starts_with("ReferenceError"));
    }

    #[test]
    fn interpreter_stays_usable_after_a_fault() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);

        assert!(owner.runner().exec("throw new Error('first')").is_err());
        owner.runner().exec("var ok = true").unwrap();
        assert_eq!(owner.runner().eval("ok").unwrap(), Some(ProtocolValue::Scalar(Atom::Int(1))));
    }

    #[test]
    fn exec_file_runs_module_body() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("setup.js");
        std::fs::write(&script, "var total = 0;\r\nfor (const n of [1, 2, 3]) total += n;\r\n").unwrap();

        owner.runner().exec_file(&script).unwrap();
        assert_eq!(owner.runner().eval("total").unwrap(), Some(ProtocolValue::Scalar(Atom::Int(6))));
    }

    #[test]
    fn exec_file_reports_unreadable_paths() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);

        let diagnostic = owner.runner().exec_file(Path::new("/nonexistent/path")).unwrap_err();
        assert_eq!(diagnostic.operation, "execfile");
        assert!(diagnostic
            .message
            .starts_with("could not open file '/nonexistent/path': "));
        assert_eq!(diagnostic.message.matches("could not open file").count(), 1);
        assert!(diagnostic.message.len() > "could not open file '/nonexistent/path': ".len());
        assert_eq!(lifecycle.active_owner_count(), 1);
    }

    #[test]
    fn run_dispatches_requests() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);
        let runner = owner.runner();

        assert_eq!(runner.run(&ExecutionRequest::Exec("var n = 3".into())).unwrap(), None);
        assert_eq!(
            runner.run(&ExecutionRequest::Eval("n * n".into())).unwrap(),
            Some(ProtocolValue::Scalar(Atom::Int(9)))
        );
    }

    #[test]
    fn import_binds_builtin_modules() {
        let lifecycle = Rc::new(Lifecycle::default());
        let owner = Owner::new(&lifecycle);
        let runner = owner.runner();

        runner.import(&lifecycle.modules(), HOST_MODULE).unwrap();
        assert_eq!(
            runner.eval("ember.name").unwrap(),
            Some(ProtocolValue::Scalar(Atom::symbol(owner.namespace.identity().as_str())))
        );
        runner.exec("ember.post('hello from script')").unwrap();

        let missing = runner.import(&lifecycle.modules(), "numpy").unwrap_err();
        assert_eq!(missing.operation, "import");
        assert!(missing.message.contains("no module named 'numpy'"));
    }
}
