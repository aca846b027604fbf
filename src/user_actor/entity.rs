use chrono::Utc;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{User, UserCreate, UserFilter, UserId};

impl Entity for User {
    const NAME: &'static str = "User";

    type Id = UserId;
    type CreateParams = UserCreate;
    type Patch = ();
    type Filter = UserFilter;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &UserId {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Errors
    /// Fails when the email is blank or the password hash is missing.
    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, FrameworkError> {
        if params.email.trim().is_empty() {
            return Err(FrameworkError::Validation("email required".to_string()));
        }
        if params.password_hash.is_empty() {
            return Err(FrameworkError::Validation("password hash required".to_string()));
        }
        Ok(Self {
            id,
            email: params.email,
            name: params.name,
            password_hash: params.password_hash,
            role: params.role,
            created_at: Utc::now(),
        })
    }

    /// Accounts are created by registration and are not edited afterwards.
    fn on_update(&mut self, _patch: ()) -> Result<(), FrameworkError> {
        Err(FrameworkError::Validation("user accounts cannot be modified".to_string()))
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        filter.email.as_deref().map_or(true, |email| self.email == email)
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("email", self.email.clone()))
    }

    /// Currently, no custom actions are defined for users.
    fn handle_action(&mut self, _action: ()) -> Result<(), FrameworkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn create(email: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            name: "Erin".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_create_requires_email_and_hash() {
        let user = User::from_create_params(1, create("erin@example.com")).unwrap();
        assert_eq!(user.unique_key(), Some(("email", "erin@example.com".to_string())));
        assert!(User::from_create_params(2, create("  ")).is_err());
        assert!(User::from_create_params(3, UserCreate { password_hash: String::new(), ..create("x@y.z") }).is_err());
    }

    #[test]
    fn test_accounts_cannot_be_patched() {
        let mut user = User::from_create_params(1, create("erin@example.com")).unwrap();
        assert!(matches!(user.on_update(()), Err(FrameworkError::Validation(_))));
        assert_eq!(user.role, Role::Customer);
    }
}
