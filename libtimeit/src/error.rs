//! Error types for Time it

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimeitError>;

#[derive(Error, Debug)]
pub enum TimeitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl TimeitError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TimeitError::Validation(_) => 3,
            TimeitError::NotFound(_) => 4,
            TimeitError::Config(_) => 2,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        TimeitError::Validation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        TimeitError::NotFound(message.into())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Could not determine the user configuration directory; set TIMEIT_CONFIG")]
    NoConfigDir,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failure reported by a notification sink. Never propagated into engine state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("No listeners for event: {0}")]
    NoListeners(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}
