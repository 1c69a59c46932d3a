//! Error handling for the scriptlet template engine.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Compile-time failures carry the
//! 1-based line and column of the offending directive code; render-time
//! failures come from statement logic. Path resolution never produces an error.
//!
//! # Examples
//!
//! ```
//! use scriptlet::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::undefined_variable("user"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

/// Result type for scriptlet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for compiling and rendering templates
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed statement code, raised while compiling
    #[error("Syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// A bare name that is neither a local binding nor a data field
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    /// An operation applied to a value of the wrong kind
    #[error("Type error: {0}")]
    Type(String),

    /// Assignment to a `const` binding
    #[error("Assignment to constant variable: {0}")]
    ConstAssignment(String),

    /// Call of a function or method the engine does not provide
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Data-context file in a format the loader does not understand
    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a new syntax error at a 1-based source position
    pub fn syntax<S: Into<String>>(message: S, line: usize, column: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a new undefined-variable error
    pub fn undefined_variable<S: Into<String>>(name: S) -> Self {
        Self::UndefinedVariable(name.into())
    }

    /// Create a new type error
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::Type(msg.into())
    }

    /// Whether the error was raised while compiling rather than rendering
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
