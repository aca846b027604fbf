use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::guard::bearer_token;
use super::{AuthError, PasswordHasher, Principal, SessionClient};
use crate::clients::UserClient;
use crate::domain::{Role, User, UserCreate};
use crate::user_actor::UserError;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Registers users, exchanges credentials for access tokens, and resolves bearer
/// headers back to the caller's identity.
#[derive(Clone)]
pub struct AuthGateway {
    users: UserClient,
    sessions: SessionClient,
    hasher: PasswordHasher,
}

impl AuthGateway {
    pub fn new(users: UserClient, sessions: SessionClient) -> Self {
        Self {
            users,
            sessions,
            hasher: PasswordHasher,
        }
    }

    /// Registers a customer account.
    ///
    /// # Errors
    /// `Validation` for a blank email or empty password, `User(AlreadyExists)` for a
    /// taken email.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        self.register_with_role(request, Role::Customer).await
    }

    /// Registers an administrator. Only reachable from startup wiring, never from a
    /// request.
    pub async fn register_admin(&self, request: RegisterRequest) -> Result<User, AuthError> {
        self.register_with_role(request, Role::Admin).await
    }

    #[instrument(skip(self, request, role), fields(user_email = %request.email, role = %role))]
    async fn register_with_role(&self, request: RegisterRequest, role: Role) -> Result<User, AuthError> {
        let email = request.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation(format!("invalid email: {:?}", request.email)));
        }
        PasswordHasher::validate_password(&request.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Email already registered");
            return Err(UserError::AlreadyExists(email).into());
        }

        let hasher = self.hasher;
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let user = self
            .users
            .create_user(UserCreate {
                email,
                name: request.name,
                password_hash,
                role,
            })
            .await?;
        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password alike.
    #[instrument(skip(self, request), fields(user_email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let Some(user) = self.users.find_by_email(request.email.trim()).await? else {
            warn!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let hasher = self.hasher;
        let password_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&request.password, &password_hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;
        if !matches {
            warn!(user_id = user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .sessions
            .issue(Principal {
                subject_id: user.id,
                email: user.email,
                role: user.role,
            })
            .await?;
        info!(user_id = user.id, "Login successful");
        Ok(LoginResponse { access_token: token.token })
    }

    /// Resolves an `Authorization` header value to the caller's identity.
    ///
    /// # Errors
    /// `MissingToken`, `MalformedToken` or `InvalidToken` (unknown or expired).
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = bearer_token(authorization)?;
        self.sessions.resolve(token.to_string()).await
    }

    /// Revokes the presented token. Revoking an unknown token is not an error.
    pub async fn logout(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let token = bearer_token(authorization)?;
        self.sessions.revoke(token.to_string()).await?;
        Ok(())
    }
}
