//! Core error model.

use thiserror::Error;

/// Result type used across the core layer.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core-level error.
///
/// Keep this focused on configuration-time failures (bad identifiers, bad
/// settings). Runtime resolution failures belong to the auth crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier was invalid (e.g. blank).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A setting was present but unusable.
    #[error("invalid setting '{path}': {reason}")]
    InvalidSetting { path: String, reason: String },

    /// A settings source could not be read or parsed.
    #[error("settings source error: {0}")]
    SettingsSource(String),
}

impl CoreError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_setting(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn settings_source(msg: impl Into<String>) -> Self {
        Self::SettingsSource(msg.into())
    }
}
