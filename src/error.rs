//! Error types and handling for Chargeguard
//!
//! Only construction and the host glue can fail. Evaluating a tick never
//! returns an error: unclassified input resolves to `ChargeState::Error`.

use thiserror::Error;

/// Result type alias for Chargeguard operations
pub type Result<T> = std::result::Result<T, ChargeGuardError>;

/// Main error type for Chargeguard
#[derive(Debug, Error)]
pub enum ChargeGuardError {
    /// Configuration-related errors (fatal at construction time)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Telemetry source errors (host glue only)
    #[error("Telemetry error: {message}")]
    Telemetry { message: String },
}

impl ChargeGuardError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ChargeGuardError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ChargeGuardError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        ChargeGuardError::Io {
            message: message.into(),
        }
    }

    /// Create a new telemetry error
    pub fn telemetry<S: Into<String>>(message: S) -> Self {
        ChargeGuardError::Telemetry {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ChargeGuardError {
    fn from(err: std::io::Error) -> Self {
        ChargeGuardError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ChargeGuardError {
    fn from(err: serde_yaml::Error) -> Self {
        ChargeGuardError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChargeGuardError {
    fn from(err: serde_json::Error) -> Self {
        ChargeGuardError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ChargeGuardError::config("test config error");
        assert!(matches!(err, ChargeGuardError::Config { .. }));

        let err = ChargeGuardError::telemetry("source closed");
        assert!(matches!(err, ChargeGuardError::Telemetry { .. }));

        let err = ChargeGuardError::validation("field", "test validation error");
        assert!(matches!(err, ChargeGuardError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = ChargeGuardError::config("test error");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Configuration error: test error");

        let err = ChargeGuardError::validation("test_field", "invalid value");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Validation error: test_field - invalid value");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ChargeGuardError = io.into();
        assert!(matches!(err, ChargeGuardError::Io { .. }));
    }
}
