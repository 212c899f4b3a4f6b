use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Body returned for domain-level failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("The email you're trying to register is already in use.")]
    EmailTaken,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("This email has not yet been registered")]
    UnknownEmail,

    #[error("Password does not match")]
    BadPassword,

    #[error("You need to login to access this page")]
    MissingAuthHeader,

    #[error("Invalid or expired token")]
    TokenRejected,

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh token is valid, but user does not exist")]
    UnknownRefreshUser,

    #[error("Refresh tokens do not match")]
    RefreshTokenMismatch,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidEmail
            | AuthError::PasswordTooShort
            | AuthError::MissingAuthHeader => StatusCode::BAD_REQUEST,
            AuthError::TokenRejected => StatusCode::UNAUTHORIZED,
            AuthError::UnknownEmail
            | AuthError::BadPassword
            | AuthError::MissingRefreshToken
            | AuthError::UnknownRefreshUser
            | AuthError::RefreshTokenMismatch => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Unexpected failures are logged server-side and surfaced as an opaque
        // 500 with no body; callers never see internal error text.
        if let AuthError::Internal(e) = &self {
            error!(error = %e, "internal error");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            success: false,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        // The users.email UNIQUE constraint is the authority on duplicates;
        // a violation maps straight to the conflict error.
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AuthError::EmailTaken;
            }
        }
        AuthError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_documented_status_codes() {
        assert_eq!(AuthError::EmailTaken.status(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::MissingAuthHeader.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::TokenRejected.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UnknownEmail.status(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::BadPassword.status(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::MissingRefreshToken.status(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::RefreshTokenMismatch.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_body_carries_success_false_and_message() {
        let body = ErrorResponse {
            success: false,
            message: AuthError::MissingRefreshToken.to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains("No refresh token available"));
    }

    #[test]
    fn internal_error_response_has_no_body() {
        let response = AuthError::Internal(anyhow::anyhow!("db down")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_maps_to_internal() {
        let err: AuthError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
