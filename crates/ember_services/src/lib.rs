//! Ember Services Layer
//!
//! Host collaborators the bridge consumes: settings, file lookup and the
//! editor text buffer.

pub mod editor;
pub mod files;
pub mod settings;

pub use editor::TextBuffer;
pub use files::{read_text, FileError, FileLocator, SearchPath};
pub use settings::{InterpreterSettings, OwnerSettings, Settings, SettingsError};
