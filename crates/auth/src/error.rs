use thiserror::Error;

/// Failure reported by a role-lookup service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The service does not know the user. Not a failure for resolution.
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    /// The service could not be reached or refused to answer.
    #[error("role lookup unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something that is not a role list.
    #[error("malformed role lookup response: {0}")]
    Malformed(String),
}

/// Failure to turn a principal name into an identity.
///
/// Raised before any context is touched, so callers never need to restore
/// anything when they see one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("cannot resolve authorities for '{principal}': {reason}")]
    LookupUnavailable { principal: String, reason: String },

    #[error("malformed authorities for '{principal}': {reason}")]
    MalformedResponse { principal: String, reason: String },

    /// The admin-user-name indirection key has no registered principal.
    #[error("no system principal registered under '{key}'")]
    SystemPrincipalUndefined { key: String },
}
