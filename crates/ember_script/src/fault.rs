//! Fault translation
//!
//! Turns interpreter failures into [`Diagnostic`]s. A thrown value is taken
//! off the context with `Ctx::catch`, rendered, and dropped before the
//! diagnostic is returned, so no interpreter handle outlives the call.

use ember_core::{Diagnostic, OwnerId};
use rquickjs::convert::Coerced;
use rquickjs::{Ctx, Value};

/// What was being attempted when a fault happened.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub label: &'static str,
    pub subject: &'a str,
}

impl<'a> Operation<'a> {
    pub fn new(label: &'static str, subject: &'a str) -> Self {
        Self { label, subject }
    }

    pub fn diagnostic(&self, owner: &OwnerId, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(owner, self.label, self.subject, message)
    }
}

/// Translates interpreter faults for one owner.
#[derive(Debug, Clone, Copy)]
pub struct FaultTranslator<'a> {
    owner: &'a OwnerId,
}

impl<'a> FaultTranslator<'a> {
    pub fn new(owner: &'a OwnerId) -> Self {
        Self { owner }
    }

    /// Pass a successful outcome through, or translate its fault.
    pub fn capture<'js, T>(
        &self,
        ctx: &Ctx<'js>,
        operation: Operation<'_>,
        outcome: rquickjs::Result<T>,
    ) -> Result<T, Diagnostic> {
        match outcome {
            Ok(value) => Ok(value),
            Err(rquickjs::Error::Exception) => {
                let thrown = ctx.catch();
                let (message, traceback) = render(ctx, &thrown);
                Err(operation
                    .diagnostic(self.owner, message)
                    .with_traceback(traceback))
            }
            Err(other) => Err(operation.diagnostic(self.owner, other.to_string())),
        }
    }
}

fn render<'js>(ctx: &Ctx<'js>, thrown: &Value<'js>) -> (String, Option<String>) {
    if let Some(exception) = thrown.as_exception() {
        let message = exception.message().unwrap_or_default();
        let name = thrown
            .as_object()
            .and_then(|object| object.get::<_, String>("name").ok())
            .unwrap_or_default();
        let rendered = match (name.is_empty(), message.is_empty()) {
            (true, _) => message,
            (false, true) => name,
            (false, false) => format!("{name}: {message}"),
        };
        return (rendered, exception.stack());
    }

    match thrown.get::<Coerced<String>>() {
        Ok(text) => (text.0, None),
        Err(_) => {
            // toString itself threw; discard that second exception too.
            let _ = ctx.catch();
            ("<unprintable exception>".to_string(), None)
        }
    }
}
