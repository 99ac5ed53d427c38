//! Error type for the auth flows.

use thiserror::Error;

use crate::email::MailError;
use crate::password::{PasswordError, PasswordRule};
use crate::session::SessionError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors surfaced by registration, verification, login, logout and the
/// admin record mutations. The messages are user-facing; anything carrying
/// internal detail is mapped to a generic page by the web layer.
#[derive(Error, Debug)]
pub enum AuthFlowError {
    /// A record with this email already exists
    #[error("User already exists with this email.")]
    DuplicateEmail,

    /// The password fails one or more complexity rules
    #[error("Password does not meet the complexity requirements.")]
    WeakPassword(Vec<PasswordRule>),

    /// The human-challenge token was absent or rejected
    #[error("Verification failed. Please try again.")]
    ChallengeFailed,

    /// No record holds this verification token
    #[error("Verification link is invalid.")]
    TokenNotFound,

    /// The verification token has expired; no resend path exists
    #[error("This verification link has expired. Please register again to receive a new one.")]
    TokenExpired,

    /// No record with this email
    #[error("User not found.")]
    UserNotFound,

    /// The account status is not active
    #[error("Account is not active.")]
    AccountInactive,

    /// The email address has not been verified yet
    #[error("Please verify your email address before logging in.")]
    EmailNotVerified,

    /// Password hash mismatch
    #[error("Invalid password.")]
    InvalidCredentials,

    /// An admin tried to delete their own record
    #[error("You cannot delete your own account.")]
    SelfDeletionForbidden,

    /// Acting user lacks admin privileges
    #[error("Access denied. Admin privileges required.")]
    Forbidden,

    /// Resource not found with context
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Error from session operations
    #[error("Session error: {0}")]
    Session(SessionError),

    /// Error from the user database operations
    #[error("User error: {0}")]
    User(UserError),

    /// Error from password hashing
    #[error("Password error: {0}")]
    Password(PasswordError),

    /// Error from email dispatch
    #[error("Mail error: {0}")]
    Mail(MailError),

    /// Error from the cache store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(UtilError),
}

impl AuthFlowError {
    /// Log the error and return self, allowing method chaining at the point
    /// where an error is constructed.
    pub fn log(self) -> Self {
        match &self {
            Self::DuplicateEmail
            | Self::WeakPassword(_)
            | Self::ChallengeFailed
            | Self::TokenNotFound
            | Self::TokenExpired
            | Self::UserNotFound
            | Self::AccountInactive
            | Self::EmailNotVerified
            | Self::InvalidCredentials => tracing::debug!("{}", self),
            Self::SelfDeletionForbidden | Self::Forbidden => tracing::warn!("{}", self),
            _ => tracing::error!("{}", self),
        }
        self
    }

    /// Whether the error only reflects bad input or a failed auth check, as
    /// opposed to an internal failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::DuplicateEmail
                | Self::WeakPassword(_)
                | Self::ChallengeFailed
                | Self::TokenNotFound
                | Self::TokenExpired
                | Self::UserNotFound
                | Self::AccountInactive
                | Self::EmailNotVerified
                | Self::InvalidCredentials
                | Self::SelfDeletionForbidden
                | Self::Forbidden
                | Self::ResourceNotFound { .. }
        )
    }
}

// From implementations that log at conversion time, so internal failures are
// recorded with full detail exactly once.

impl From<SessionError> for AuthFlowError {
    fn from(err: SessionError) -> Self {
        let error = Self::Session(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UserError> for AuthFlowError {
    fn from(err: UserError) -> Self {
        let error = Self::User(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<PasswordError> for AuthFlowError {
    fn from(err: PasswordError) -> Self {
        let error = Self::Password(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<MailError> for AuthFlowError {
    fn from(err: MailError) -> Self {
        let error = Self::Mail(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for AuthFlowError {
    fn from(err: UtilError) -> Self {
        let error = Self::Utils(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<AuthFlowError>();
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            AuthFlowError::DuplicateEmail.to_string(),
            "User already exists with this email."
        );
        assert_eq!(AuthFlowError::UserNotFound.to_string(), "User not found.");
        assert_eq!(
            AuthFlowError::AccountInactive.to_string(),
            "Account is not active."
        );
        assert_eq!(
            AuthFlowError::InvalidCredentials.to_string(),
            "Invalid password."
        );
        assert!(AuthFlowError::TokenExpired.to_string().contains("register again"));
    }

    #[test]
    fn test_distinct_login_failure_messages() {
        // Each login failure cause has its own message text.
        let messages = [
            AuthFlowError::UserNotFound.to_string(),
            AuthFlowError::AccountInactive.to_string(),
            AuthFlowError::EmailNotVerified.to_string(),
            AuthFlowError::InvalidCredentials.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_is_user_facing_classification() {
        assert!(AuthFlowError::DuplicateEmail.is_user_facing());
        assert!(AuthFlowError::WeakPassword(vec![]).is_user_facing());
        assert!(AuthFlowError::Forbidden.is_user_facing());
        assert!(!AuthFlowError::Storage("db down".to_string()).is_user_facing());
        assert!(
            !AuthFlowError::User(UserError::Storage("x".to_string())).is_user_facing()
        );
    }

    #[test]
    fn test_log_returns_self() {
        let err = AuthFlowError::DuplicateEmail.log();
        assert!(matches!(err, AuthFlowError::DuplicateEmail));
    }
}
