use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::errors::CheckoutError;

/// HTTP-facing error type. Everything a handler can fail with collapses to
/// one of these; the response body carries a single user-facing message and
/// the detail stays in the logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not authenticated")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    #[error("cart is empty")]
    CartEmpty,

    #[error("this checkout attempt was already processed")]
    DuplicateCheckout,

    /// A read against the store failed; the client may retry.
    #[error("service temporarily unavailable")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotAuthenticated => AppError::Unauthorized,
            AuthError::Denied { .. } => AppError::Forbidden(e.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::ValidationFailed { field } => AppError::Validation { field },
            CheckoutError::CartEmpty => AppError::CartEmpty,
            CheckoutError::DuplicateCheckout { .. } => AppError::DuplicateCheckout,
            CheckoutError::DataUnavailable(source) => AppError::Unavailable(source.to_string()),
            err @ CheckoutError::PartialOrderFailure { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CartEmpty | AppError::DuplicateCheckout => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal detail never leaves the process in a body.
        let message = match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Unavailable(_) => "Service temporarily unavailable".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use uuid::Uuid;

    use super::*;
    use crate::auth::Role;
    use crate::domain::errors::StoreError;

    #[test]
    fn status_codes_match_the_error_taxonomy() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("requires the seller role".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Validation { field: "city" }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::CartEmpty.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::DuplicateCheckout.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Unavailable("db down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("oops".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_leaked_in_the_body() {
        let resp = AppError::Internal("connection string postgres://...".to_string());
        let body = resp.error_response();
        assert_eq!(body.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The Display impl carries the detail, the response must not.
        assert!(resp.to_string().contains("connection string"));
    }

    #[test]
    fn validation_failure_names_the_field() {
        let err: AppError = CheckoutError::ValidationFailed { field: "province" }.into();
        assert_eq!(err.to_string(), "missing required field: province");
    }

    #[test]
    fn checkout_errors_map_to_the_right_variants() {
        assert!(matches!(
            AppError::from(CheckoutError::CartEmpty),
            AppError::CartEmpty
        ));
        assert!(matches!(
            AppError::from(CheckoutError::DuplicateCheckout {
                attempt_id: Uuid::new_v4()
            }),
            AppError::DuplicateCheckout
        ));
        assert!(matches!(
            AppError::from(CheckoutError::DataUnavailable(StoreError(
                "read failed".to_string()
            ))),
            AppError::Unavailable(_)
        ));
        assert!(matches!(
            AppError::from(CheckoutError::PartialOrderFailure {
                placed: vec![],
                failures: vec![]
            }),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert!(matches!(
            AppError::from(AuthError::NotAuthenticated),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AuthError::Denied {
                required: Role::Seller
            }),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn diesel_not_found_maps_to_404() {
        let err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, AppError::NotFound));
    }
}
