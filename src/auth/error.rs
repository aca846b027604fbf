//! Authentication errors.

use thiserror::Error;

use crate::domain::Role;
use crate::user_actor::UserError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// Unknown email or wrong password. The two are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token provided")]
    MissingToken,

    #[error("invalid token format")]
    MalformedToken,

    /// Unknown, revoked or expired token.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("insufficient permissions: {required} role required")]
    Forbidden { required: Role },

    #[error("invalid registration: {0}")]
    Validation(String),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("session service unavailable: {0}")]
    ServiceUnavailable(String),
}
