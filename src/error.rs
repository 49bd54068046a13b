//! Unified error types for volley-stats.
//!
//! Aggregation never fails: missing records fall back to zero and empty
//! totals short-circuit to 0%. Errors only come from the boundaries: setup
//! validation, wizard transitions, snapshot and config I/O, and the export
//! writers. None of them touch the match state.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for volley-stats operations.
#[derive(Error, Debug)]
pub enum VolleyError {
    /// I/O errors from snapshot, config or export file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Match setup rejected (no players, bad set count, duplicate names).
    #[error("setup error: {message}")]
    Setup { message: String },

    /// Wizard transition or action not allowed in the current step.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// Player name not part of the match.
    #[error("unknown player: {name}")]
    UnknownPlayer { name: String },

    /// Set number outside `1..=set_count`.
    #[error("invalid set {set}: match has {set_count} set(s)")]
    InvalidSet { set: u32, set_count: u8 },

    /// Session command that could not be parsed.
    #[error("usage: {message}")]
    Usage { message: String },

    /// Spreadsheet or document writer failure.
    #[error("export error: {message}")]
    Export { message: String },

    /// JSON or snapshot parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for volley-stats operations.
pub type Result<T> = std::result::Result<T, VolleyError>;

impl VolleyError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a setup validation error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an unknown player error.
    pub fn unknown_player(name: impl Into<String>) -> Self {
        Self::UnknownPlayer { name: name.into() }
    }

    /// Create an invalid set error.
    pub fn invalid_set(set: u32, set_count: u8) -> Self {
        Self::InvalidSet { set, set_count }
    }

    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an export error.
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error came from user input rather than the environment.
    ///
    /// User errors are answered in place and the session goes on; anything
    /// else (disk, export, config) marks an interactive session as failed.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Setup { .. }
                | Self::InvalidState { .. }
                | Self::UnknownPlayer { .. }
                | Self::InvalidSet { .. }
                | Self::Usage { .. }
        )
    }
}

impl From<io::Error> for VolleyError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for VolleyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Used where a broken optional input (a config layer) must not stop the
/// program: log the error and continue with the default.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the volley-stats CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed (bad input, export failure).
    pub const ERROR: i32 = 1;

    /// Process panicked.
    pub const CRASH: i32 = 3;
}
