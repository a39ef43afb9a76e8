//! Owner identities and diagnostics

use std::fmt;

/// Process-unique identity of one bridge owner and its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured report of a failed operation.
///
/// Produced only when something went wrong; a successful operation has no
/// diagnostic at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub owner: OwnerId,
    /// Operation label, e.g. `eval` or `execfile`.
    pub operation: String,
    /// What the operation was applied to: source text, path or module name.
    pub subject: String,
    pub message: String,
    /// Interpreter stack trace, when the fault carried one.
    pub traceback: Option<String>,
}

impl Diagnostic {
    pub fn new(
        owner: &OwnerId,
        operation: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.clone(),
            operation: operation.into(),
            subject: subject.into(),
            message: message.into(),
            traceback: None,
        }
    }

    pub fn with_traceback(mut self, traceback: Option<String>) -> Self {
        self.traceback = traceback.filter(|trace| !trace.trim().is_empty());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subject.is_empty() {
            write!(f, "[{}] <- ({}): {}", self.owner, self.operation, self.message)
        } else {
            write!(
                f,
                "[{}] <- ({} {}): {}",
                self.owner, self.operation, self.subject, self.message
            )
        }
    }
}

impl std::error::Error for Diagnostic {}
