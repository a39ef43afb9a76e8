use thiserror::Error;

/// Errors raised while starting, sharing or stopping the interpreter.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not extend built-in module table: module '{name}' is already registered")]
    ModuleRegistration { name: String },

    #[error("built-in module '{name}' must be registered before the interpreter starts")]
    RegistrationClosed { name: String },

    #[error("interpreter was finalized; scripting cannot restart in this process")]
    Finalized,

    #[error("interpreter is not running")]
    NotReady,

    #[error("interpreter error: {0}")]
    Interpreter(#[from] rquickjs::Error),
}
