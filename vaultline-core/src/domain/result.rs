//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure, timeout, or non-success HTTP status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered, but not with a usable record collection
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Operation is not valid for the current session state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an illegal state error
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the record store could not be read (as opposed to a local fault)
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::MalformedResponse(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a login attempt did not produce a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account vault is unavailable: {0}")]
    VaultUnavailable(String),

    #[error("A login attempt is already in progress")]
    AlreadyInProgress,
}

impl AuthError {
    /// Message shown to the user, without transport internals
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid username or password.",
            AuthError::VaultUnavailable(_) => {
                "The account vault could not be reached. Please try again shortly."
            }
            AuthError::AlreadyInProgress => "Already signing in, please wait.",
        }
    }
}
