//! Identity service errors

use thiserror::Error;

use crate::data::sqlite::SqliteError;

/// Error kinds surfaced by [`super::IdentityService`]
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<SqliteError> for IdentityError {
    fn from(e: SqliteError) -> Self {
        match e {
            SqliteError::Conflict(message) => Self::AlreadyExists(message),
            SqliteError::MissingReference(message) => Self::NotFound(message),
            other => {
                tracing::error!(error = %other, "Identity storage error");
                Self::Internal("database operation failed".to_string())
            }
        }
    }
}

impl From<argon2::password_hash::Error> for IdentityError {
    fn from(e: argon2::password_hash::Error) -> Self {
        tracing::error!(error = %e, "Password hashing failed");
        Self::Internal("password hashing failed".to_string())
    }
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(e: tokio::task::JoinError) -> Self {
        tracing::error!(error = %e, "Blocking task failed");
        Self::Internal("background task failed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_errors_map_to_kinds() {
        let err: IdentityError = SqliteError::Conflict("user already exists".into()).into();
        assert!(matches!(err, IdentityError::AlreadyExists(ref m) if m == "user already exists"));

        let err: IdentityError = SqliteError::MissingReference("binding".into()).into();
        assert!(matches!(err, IdentityError::NotFound(_)));
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err: IdentityError = SqliteError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, IdentityError::Internal(_)));
        assert_eq!(err.to_string(), "internal error: database operation failed");
    }
}
