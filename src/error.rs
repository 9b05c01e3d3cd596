//! # Error Types
//!
//! Custom error types for Skyline Input using `thiserror`.
//!
//! The per-frame input path never fails: missing controllers, empty hit tests
//! and disabled targets are normal states. Errors only surface while loading
//! configuration or opening platform devices.

use thiserror::Error;

/// Main error type for Skyline Input
#[derive(Debug, Error)]
pub enum InputError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input device errors (enumeration, state queries)
    #[error("Input device error: {0}")]
    Device(String),

    /// No usable input device of the requested class was found
    #[error("No {0} device found")]
    DeviceNotFound(&'static str),
}

/// Result type alias for Skyline Input
pub type Result<T> = std::result::Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_message() {
        let err = InputError::DeviceNotFound("gamepad");
        assert_eq!(err.to_string(), "No gamepad device found");
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))?
        }
        assert!(matches!(open(), Err(InputError::Io(_))));
    }
}
