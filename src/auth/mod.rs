//! Authentication and authorization.
//!
//! The gateway resolves a bearer credential into a [`Principal`]; the role guard
//! checks that principal against the capability an operation declares.

mod error;
mod gateway;
mod guard;
mod password;
mod session_service;
mod token;

pub use error::AuthError;
pub use gateway::{AuthGateway, LoginRequest, LoginResponse, RegisterRequest};
pub use guard::{bearer_token, Capability, RoleGuard};
pub use password::PasswordHasher;
pub use session_service::{SessionClient, SessionRequest, SessionService};
pub use token::{AccessToken, Principal};
