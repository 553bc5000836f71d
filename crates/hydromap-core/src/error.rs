//! Error types for hydromap.

use thiserror::Error;

/// Result type alias using hydromap's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hydromap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A relation required by the data model is missing or duplicated
    /// (null geometry, duplicate category name, dangling foreign key).
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Geometry decoding failed
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("perceptual model 42".to_string());
        assert_eq!(err.to_string(), "Not found: perceptual model 42");
    }

    #[test]
    fn test_error_display_data_integrity() {
        let err = Error::DataIntegrity("location 7 has no geometry".to_string());
        assert_eq!(
            err.to_string(),
            "Data integrity error: location 7 has no geometry"
        );
    }

    #[test]
    fn test_error_display_geometry() {
        let err = Error::Geometry("truncated WKB buffer".to_string());
        assert_eq!(err.to_string(), "Geometry error: truncated WKB buffer");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("DATABASE_URL is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: DATABASE_URL is not set"
        );
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("latitude out of range".to_string());
        assert_eq!(err.to_string(), "Invalid input: latitude out of range");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
