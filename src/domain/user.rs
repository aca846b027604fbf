use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the permission level of `required`.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Admin => 1,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a registered user in the system.
///
/// The password hash is never serialised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub email: Option<String>,
}
