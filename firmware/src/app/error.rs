//! App Management Error Types

use alloc::string::String;
use core::fmt;

/// App management error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No native app and no script module with this name.
    NotFound(String),
    /// The resolved module lacks a mandatory lifecycle hook.
    MissingCapability {
        name: String,
        missing: &'static str,
    },
    /// The scripting runtime failed to load the module.
    ScriptFailed(String),
    /// Registry slot index out of range.
    InvalidSlot(usize),
    /// A native app with this name is already registered.
    AlreadyRegistered(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(name) => write!(f, "app not found: {}", name),
            AppError::MissingCapability { name, missing } => {
                write!(f, "app '{}' is missing {}()", name, missing)
            }
            AppError::ScriptFailed(msg) => write!(f, "script failed: {}", msg),
            AppError::InvalidSlot(index) => write!(f, "invalid app slot {}", index),
            AppError::AlreadyRegistered(name) => write!(f, "app already registered: {}", name),
        }
    }
}
