use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Session error")]
    SessionError,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Header error: {0}")]
    HeaderError(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(SessionError::SessionError.to_string(), "Session error");
        assert_eq!(
            SessionError::Storage("redis down".to_string()).to_string(),
            "Storage error: redis down"
        );
    }

    #[test]
    fn test_from_util_error() {
        let err: SessionError = UtilError::Crypto("rng failed".to_string()).into();
        assert!(matches!(err, SessionError::Utils(_)));
    }
}
