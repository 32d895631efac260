// SPDX-License-Identifier: MIT

//! Typed error handling for wip-queue
//!
//! Unresolved condition fields are not errors: they evaluate to `false`.

use thiserror::Error;

/// Top-level error type for wip-queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// Malformed condition text
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Project source that is not well-formed or misses a required attribute
    #[error("Malformed source: {0}")]
    MalformedSource(String),

    /// Invocable command could not be launched
    #[error("Failed to execute '{command}': {message}")]
    Execution { command: String, message: String },

    /// Operator supplied a queue position that is not an integer
    #[error("Invalid queue position: {0}")]
    InvalidPosition(String),

    /// No work item stored under the given hash
    #[error("Unknown work item '{0}'")]
    UnknownItem(String),

    /// No rule definition at the given index
    #[error("Unknown rule #{0}")]
    UnknownRule(usize),

    /// Configuration errors (missing files, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl QueueError {
    /// Create a syntax error for a 1-based line number
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Create a malformed source error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSource(message.into())
    }

    /// Create an execution error
    pub fn execution(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<roxmltree::Error> for QueueError {
    fn from(err: roxmltree::Error) -> Self {
        Self::MalformedSource(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
