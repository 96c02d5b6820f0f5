/// Error Handling Module
///
/// Every failure the auth core can produce is a distinct, recoverable kind:
/// the HTTP boundary branches on the kind to pick status semantics, and
/// nothing here crashes the process. Token errors deliberately distinguish
/// "expired" from "forged" from "unparsable" because they map to different
/// user-facing outcomes.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Central error type for the authentication and authorization core
#[derive(Debug)]
pub enum AuthError {
    /// Absent identifier/password/token input
    MissingCredentials,
    /// Identifier does not resolve to any stored principal
    PrincipalNotFound,
    /// Password verification failed
    InvalidCredentials,
    /// Username or email already registered
    DuplicatePrincipal(String),
    /// Structurally invalid token
    TokenMalformed,
    /// Signature verification failed (tampered or foreign key)
    TokenBadSignature,
    /// Correctly signed but past its validity window
    TokenExpired,
    /// Signature and expiry pass but the stored refresh hash does not match
    /// (superseded or revoked)
    RefreshMismatch,
    /// Decoded claims fail the requested authorization policy
    Unauthorized,
    Validation(ValidationError),
    /// Credential store failure (connection, query)
    Store(String),
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing credentials"),
            AuthError::PrincipalNotFound => write!(f, "User not found"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::DuplicatePrincipal(field) => {
                write!(f, "{} is already registered", field)
            }
            AuthError::TokenMalformed => write!(f, "Malformed token"),
            AuthError::TokenBadSignature => write!(f, "Invalid token signature"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::RefreshMismatch => write!(f, "Invalid refresh token"),
            AuthError::Unauthorized => write!(f, "Not authorized for this operation"),
            AuthError::Validation(e) => write!(f, "{}", e),
            AuthError::Store(msg) => write!(f, "Store error: {}", msg),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AuthError {}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err)
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AuthError::DuplicatePrincipal("username or email".to_string())
        } else {
            AuthError::Store(error_msg)
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for log correlation
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::PrincipalNotFound => "NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::DuplicatePrincipal(_) => "DUPLICATE_ENTRY",
            AuthError::TokenMalformed => "TOKEN_MALFORMED",
            AuthError::TokenBadSignature => "TOKEN_INVALID",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::RefreshMismatch => "REFRESH_MISMATCH",
            AuthError::Unauthorized => "FORBIDDEN",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Store(_) => "STORE_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AuthError::Store(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Credential store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
            AuthError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            other => {
                tracing::warn!(
                    error_id = error_id,
                    error = %other,
                    code = other.code(),
                    "Auth rejection"
                );
            }
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::PrincipalNotFound => StatusCode::NOT_FOUND,
            AuthError::DuplicatePrincipal(_) => StatusCode::CONFLICT,
            AuthError::MissingCredentials
            | AuthError::InvalidCredentials
            | AuthError::TokenMalformed
            | AuthError::TokenBadSignature
            | AuthError::TokenExpired
            | AuthError::RefreshMismatch => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized => StatusCode::FORBIDDEN,
            AuthError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let status = self.status_code();
        // Store and internal failures get a generic message; everything else
        // is safe to surface verbatim.
        let message = match self {
            AuthError::Store(_) => "Service temporarily unavailable".to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse::new(
            error_id,
            message,
            self.code().to_string(),
            status.as_u16(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email");
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AuthError = ValidationError::InvalidFormat("email").into();
        match err {
            AuthError::Validation(_) => (),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_token_error_kinds_are_distinct() {
        // The boundary layer branches on the code, so expired, forged and
        // malformed tokens must never collapse into one kind.
        assert_ne!(AuthError::TokenExpired.code(), AuthError::TokenBadSignature.code());
        assert_ne!(AuthError::TokenExpired.code(), AuthError::TokenMalformed.code());
        assert_ne!(AuthError::TokenExpired.code(), AuthError::RefreshMismatch.code());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::PrincipalNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::DuplicatePrincipal("email".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }
}
