//! Error types for caller-comment interception.

use thiserror::Error;

/// Result type alias for interceptor configuration and rewriting.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the interceptor itself.
///
/// Faults coming from the database are never converted into this type; they
/// reach the caller as the original `sea_orm::DbErr`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The interceptor properties are missing or unusable.
    #[error("{0}")]
    InvalidConfiguration(String),

    /// A matched call did not carry a SQL string as its first argument.
    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
