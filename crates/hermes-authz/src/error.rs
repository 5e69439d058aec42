//! Error types for the authorization crate.

use hermes_core::{ApiError, HttpError};
use thiserror::Error;

/// Result type for permission checks.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// A failed permission check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthzError {
    /// The caller must authenticate first.
    #[error("authentication required by {permission}")]
    AuthRequired {
        /// Name of the failing permission.
        permission: String,
    },

    /// The caller is known but not allowed.
    #[error("access denied by {permission}: {reason}")]
    Forbidden {
        /// Name of the failing permission.
        permission: String,
        /// Reason for denial.
        reason: String,
    },
}

impl AuthzError {
    /// Create an authentication-required error.
    #[must_use]
    pub fn auth_required(permission: impl Into<String>) -> Self {
        Self::AuthRequired {
            permission: permission.into(),
        }
    }

    /// Create an access denied error.
    #[must_use]
    pub fn forbidden(permission: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            permission: permission.into(),
            reason: reason.into(),
        }
    }

    /// Name of the permission that failed.
    #[must_use]
    pub fn permission(&self) -> &str {
        match self {
            Self::AuthRequired { permission } | Self::Forbidden { permission, .. } => permission,
        }
    }

    /// The error rendered to the caller. The reason is never exposed.
    #[must_use]
    pub fn to_http_error(&self) -> HttpError {
        match self {
            Self::AuthRequired { .. } => HttpError::auth_required(),
            Self::Forbidden { .. } => HttpError::forbidden(),
        }
    }
}

impl From<AuthzError> for HttpError {
    fn from(err: AuthzError) -> Self {
        err.to_http_error()
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        Self::Http(err.to_http_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::HttpErrorKind;

    #[test]
    fn test_auth_required_error() {
        let err = AuthzError::auth_required("LoginRequired");
        assert_eq!(err.permission(), "LoginRequired");
        assert_eq!(err.to_string(), "authentication required by LoginRequired");
        assert_eq!(err.to_http_error().kind(), HttpErrorKind::AuthRequired);
    }

    #[test]
    fn test_forbidden_error_hides_reason() {
        let err = AuthzError::forbidden("OwnerOnly", "not the owner");
        assert!(err.to_string().contains("not the owner"));

        let http: HttpError = err.into();
        assert_eq!(http.http_code(), 403);
        assert_eq!(http.description(), "Forbidden");
    }
}
