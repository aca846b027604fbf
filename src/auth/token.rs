//! Access tokens and the identity they resolve to.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::Serialize;

use crate::domain::{Role, UserId};

/// The resolved caller identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub subject_id: UserId,
    pub email: String,
    pub role: Role,
}

/// An issued bearer token. The token string itself is opaque random data; the
/// claims live with the session service.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn issue(principal: Principal, ttl: TimeDelta) -> Self {
        let issued_at = Utc::now();
        Self {
            token: generate_token_string(),
            principal,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

fn generate_token_string() -> String {
    let bytes: [u8; 24] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Principal {
        Principal { subject_id: 1, email: "alice@example.com".into(), role: Role::Customer }
    }

    #[test]
    fn test_token_generation() {
        let token = AccessToken::issue(alice(), TimeDelta::days(1));
        assert_eq!(token.token.len(), 32);
        assert!(!token.is_expired_at(Utc::now()));
        assert!(token.is_expired_at(token.issued_at + TimeDelta::days(1)));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = AccessToken::issue(alice(), TimeDelta::days(1));
        let b = AccessToken::issue(alice(), TimeDelta::days(1));
        assert_ne!(a.token, b.token);
    }
}
