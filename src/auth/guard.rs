//! Role guard: every authenticated storefront operation declares the capability it
//! needs, and the resolved principal is checked against it before the operation runs.

use tracing::warn;

use super::{AuthError, Principal};
use crate::domain::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Product and category create/update/delete.
    ManageCatalog,
    PlaceOrder,
    ViewOwnOrders,
}

impl Capability {
    /// Minimum role that holds the capability.
    pub fn required_role(self) -> Role {
        match self {
            Capability::ManageCatalog => Role::Admin,
            Capability::PlaceOrder | Capability::ViewOwnOrders => Role::Customer,
        }
    }
}

pub struct RoleGuard;

impl RoleGuard {
    pub fn authorize(principal: &Principal, capability: Capability) -> Result<(), AuthError> {
        let required = capability.required_role();
        if principal.role.has_permission(required) {
            return Ok(());
        }
        warn!(
            subject_id = principal.subject_id,
            role = %principal.role,
            ?capability,
            "Permission denied"
        );
        Err(AuthError::Forbidden { required })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MalformedToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal { subject_id: 1, email: "x@example.com".into(), role }
    }

    #[test]
    fn test_admin_satisfies_every_capability() {
        let admin = principal(Role::Admin);
        for capability in [
            Capability::ManageCatalog,
            Capability::PlaceOrder,
            Capability::ViewOwnOrders,
        ] {
            assert!(RoleGuard::authorize(&admin, capability).is_ok());
        }
    }

    #[test]
    fn test_required_roles() {
        assert_eq!(Capability::ManageCatalog.required_role(), Role::Admin);
        assert_eq!(Capability::PlaceOrder.required_role(), Role::Customer);
        assert_eq!(Capability::ViewOwnOrders.required_role(), Role::Customer);
    }

    #[test]
    fn test_customer_cannot_manage_catalog() {
        let customer = principal(Role::Customer);
        assert_eq!(
            RoleGuard::authorize(&customer, Capability::ManageCatalog),
            Err(AuthError::Forbidden { required: Role::Admin })
        );
        assert!(RoleGuard::authorize(&customer, Capability::PlaceOrder).is_ok());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc123")), Ok("abc123"));
        assert_eq!(bearer_token(Some("bearer abc123")), Ok("abc123"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::MalformedToken));
        assert_eq!(bearer_token(Some("Bearer   ")), Err(AuthError::MalformedToken));
        assert_eq!(bearer_token(Some("Basic abc123")), Err(AuthError::MalformedToken));
    }
}
