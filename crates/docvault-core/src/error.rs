//! Error types for docvault.

use thiserror::Error;

/// Result type alias using docvault's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for docvault operations.
///
/// The variants follow the ingestion pipeline's failure taxonomy: caller
/// mistakes (`Validation`, `NotFound`, `Conflict`) are client-class, while
/// backend failures (`DependencyUnavailable`, `Storage`, `Database`,
/// `Internal`) are server-class. See [`Error::status_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// Size, type, or tenant-ownership violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document, folder, or tag absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate content (checksum uniqueness)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Search index unconfigured, or conversion/extraction call failed
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Object store I/O failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP-class status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::DependencyUnavailable(_) => 502,
            Error::Storage(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Internal(_) => 500,
        }
    }

    /// True when the caller, not the system, is at fault (4xx class).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::DependencyUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("file too large".to_string());
        assert_eq!(err.to_string(), "Validation error: file too large");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("document 42".to_string());
        assert_eq!(err.to_string(), "Not found: document 42");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("document with this checksum already exists".to_string());
        assert_eq!(
            err.to_string(),
            "Conflict: document with this checksum already exists"
        );
    }

    #[test]
    fn test_error_display_dependency() {
        let err = Error::DependencyUnavailable("search index is not configured".to_string());
        assert_eq!(
            err.to_string(),
            "Dependency unavailable: search index is not configured"
        );
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("bucket unreachable".to_string());
        assert_eq!(err.to_string(), "Storage error: bucket unreachable");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation(String::new()).status_code(), 400);
        assert_eq!(Error::NotFound(String::new()).status_code(), 404);
        assert_eq!(Error::Conflict(String::new()).status_code(), 409);
        assert_eq!(Error::DependencyUnavailable(String::new()).status_code(), 502);
        assert_eq!(Error::Storage(String::new()).status_code(), 500);
        assert_eq!(Error::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_client_error_class() {
        assert!(Error::Validation("x".into()).is_client_error());
        assert!(Error::Conflict("x".into()).is_client_error());
        assert!(Error::NotFound("x".into()).is_client_error());
        assert!(!Error::Storage("x".into()).is_client_error());
        assert!(!Error::DependencyUnavailable("x".into()).is_client_error());
    }

    #[test]
    fn test_error_is_debug() {
        let err = Error::Internal("oops".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Internal"));
    }
}
