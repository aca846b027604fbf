//! Top-level error taxonomy. Every domain error folds into [`ShopError`], which is
//! what the storefront returns and what a transport binding maps to a status code.

use serde::Serialize;
use thiserror::Error;

use super::ConfigError;
use crate::auth::AuthError;
use crate::catalog::QueryError;
use crate::category_actor::CategoryError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShopError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{field} already exists: {value}")]
    Conflict { field: &'static str, value: String },
    #[error("{reason}")]
    BadRequest { reason: String },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopError {
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::NotFound { .. } => 404,
            ShopError::Conflict { .. } => 409,
            ShopError::BadRequest { .. } => 400,
            ShopError::Unauthorized(_) => 401,
            ShopError::Forbidden(_) => 403,
            ShopError::Internal(_) => 500,
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ShopError::NotFound { entity, id: id.to_string() }
    }

    pub fn bad_request(reason: impl ToString) -> Self {
        ShopError::BadRequest { reason: reason.to_string() }
    }
}

/// Error body for a transport binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: &'static str,
    pub message: String,
}

impl From<&ShopError> for ErrorResponse {
    fn from(err: &ShopError) -> Self {
        let error = match err {
            ShopError::NotFound { .. } => "Not Found",
            ShopError::Conflict { .. } => "Conflict",
            ShopError::BadRequest { .. } => "Bad Request",
            ShopError::Unauthorized(_) => "Unauthorized",
            ShopError::Forbidden(_) => "Forbidden",
            ShopError::Internal(_) => "Internal Server Error",
        };
        Self {
            status_code: err.status_code(),
            error,
            message: err.to_string(),
        }
    }
}

impl From<ProductError> for ShopError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => ShopError::not_found("Product", id),
            ProductError::InsufficientStock { .. }
            | ProductError::InvalidQuantity(_)
            | ProductError::ValidationError(_) => ShopError::bad_request(err),
            ProductError::ActorCommunicationError(reason) => ShopError::Internal(reason),
        }
    }
}

impl From<CategoryError> for ShopError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(id) => ShopError::not_found("Category", id),
            CategoryError::AlreadyExists(value) => ShopError::Conflict { field: "name", value },
            CategoryError::ValidationError(_) => ShopError::bad_request(err),
            CategoryError::ActorCommunicationError(reason) => ShopError::Internal(reason),
        }
    }
}

impl From<UserError> for ShopError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => ShopError::not_found("User", id),
            UserError::AlreadyExists(value) => ShopError::Conflict { field: "email", value },
            UserError::ValidationError(_) => ShopError::bad_request(err),
            UserError::ActorCommunicationError(reason) => ShopError::Internal(reason),
        }
    }
}

impl From<OrderError> for ShopError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => ShopError::not_found("Order", id),
            OrderError::ProductNotFound(id) => ShopError::not_found("Product", id),
            OrderError::InsufficientStock { .. } | OrderError::ValidationError(_) => ShopError::bad_request(err),
            OrderError::ActorCommunicationError(reason) => ShopError::Internal(reason),
        }
    }
}

impl From<AuthError> for ShopError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::User(user_err) => user_err.into(),
            AuthError::Forbidden { .. } => ShopError::Forbidden(err.to_string()),
            AuthError::Validation(_) => ShopError::bad_request(err),
            AuthError::Hashing(_) | AuthError::ServiceUnavailable(_) => ShopError::Internal(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::InvalidToken => ShopError::Unauthorized(err.to_string()),
        }
    }
}

impl From<QueryError> for ShopError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Store(product_err) => product_err.into(),
            QueryError::UnknownSortField(_)
            | QueryError::UnknownSortOrder(_)
            | QueryError::InvalidPage
            | QueryError::InvalidLimit => ShopError::bad_request(err),
        }
    }
}

impl From<ConfigError> for ShopError {
    fn from(err: ConfigError) -> Self {
        ShopError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ShopError::from(ProductError::NotFound("3".into())), 404),
            (ShopError::from(OrderError::ProductNotFound("999".into())), 404),
            (ShopError::from(CategoryError::AlreadyExists("Books".into())), 409),
            (ShopError::from(UserError::AlreadyExists("a@b.c".into())), 409),
            (
                ShopError::from(OrderError::InsufficientStock { product_id: 1, requested: 6, available: 4 }),
                400,
            ),
            (ShopError::from(QueryError::UnknownSortField("password".into())), 400),
            (ShopError::from(AuthError::InvalidCredentials), 401),
            (ShopError::from(AuthError::InvalidToken), 401),
            (ShopError::from(AuthError::Forbidden { required: Role::Admin }), 403),
            (ShopError::from(ProductError::ActorCommunicationError("closed".into())), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
        }
    }

    #[test]
    fn test_nested_errors_keep_their_kind() {
        assert_eq!(
            ShopError::from(AuthError::User(UserError::AlreadyExists("a@b.c".into()))),
            ShopError::Conflict { field: "email", value: "a@b.c".into() }
        );
        assert_eq!(
            ShopError::from(QueryError::Store(ProductError::NotFound("9".into()))),
            ShopError::not_found("Product", "9")
        );
    }

    #[test]
    fn test_error_response_shape() {
        let err = ShopError::from(OrderError::NotFound("12".into()));
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"statusCode": 404, "error": "Not Found", "message": "Order not found: 12"})
        );
    }
}
