//! Error types module
//!
//! Each stage of the upload lifecycle has its own error enum. Errors that reach a
//! caller are converted to plain data ([`UploadFailure`](crate::models::UploadFailure))
//! before they cross a task boundary, so nothing is thrown across the async edge.
//!
//! Propagation policy:
//! - [`ValidationError`] surfaces immediately and prevents a session from starting.
//! - [`ExtractionError`] is caught by the controller, logged, and leaves metadata empty.
//! - [`ProcessingError`] moves the session to `error`.

use crate::models::UploadState;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected conditions like rejected commands
    Debug,
    /// Warning level - for recoverable issues like rejected files
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented and logged.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether the user can recover by retrying the same action
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Rejection produced by the file validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported format: {declared_type} (accepted: {accepted:?})")]
    UnsupportedFormat {
        declared_type: String,
        accepted: Vec<String>,
    },

    #[error("file too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
}

impl ValidationError {
    /// Short, stable rejection reason.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedFormat { .. } => "unsupported format",
            ValidationError::FileTooLarge { .. } => "file too large",
        }
    }

    /// Message shown to the user next to the drop zone.
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::UnsupportedFormat { accepted, .. } => {
                let formats: Vec<String> = accepted
                    .iter()
                    .map(|t| t.rsplit('/').next().unwrap_or(t).to_uppercase())
                    .collect();
                format!("Unsupported file format. Please use: {}", formats.join(", "))
            }
            ValidationError::FileTooLarge { max, .. } => format!(
                "File too large. Maximum size: {:.1}GB",
                *max as f64 / crate::constants::BYTES_PER_GB as f64
            ),
        }
    }
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        self.user_message()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

/// Failure of the metadata extractor. Never fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Empty file")]
    EmptyFile,

    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("Extraction failed: {0}")]
    Internal(String),
}

impl ErrorMetadata for ExtractionError {
    fn error_code(&self) -> &'static str {
        match self {
            ExtractionError::EmptyFile => "EMPTY_FILE",
            ExtractionError::UnsupportedContainer(_) => "UNSUPPORTED_CONTAINER",
            ExtractionError::Cancelled => "EXTRACTION_CANCELLED",
            ExtractionError::Internal(_) => "EXTRACTION_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ExtractionError::Internal(_))
    }

    fn client_message(&self) -> String {
        "File details are unavailable for this file".to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ExtractionError::Cancelled => LogLevel::Debug,
            _ => LogLevel::Warn,
        }
    }
}

/// Failure of the processing stage. Fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessingError {
    #[error("Processing failed: {0}")]
    Failed(String),

    #[error("Processing cancelled")]
    Cancelled,
}

impl ErrorMetadata for ProcessingError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessingError::Failed(_) => "PROCESSING_FAILED",
            ProcessingError::Cancelled => "PROCESSING_CANCELLED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ProcessingError::Failed(_))
    }

    fn client_message(&self) -> String {
        crate::constants::PROCESSING_FAILED_MESSAGE.to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ProcessingError::Failed(_) => LogLevel::Error,
            ProcessingError::Cancelled => LogLevel::Debug,
        }
    }
}

/// Error returned by a controller command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("File rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("An upload is already {state}")]
    Busy { state: UploadState },

    #[error("Cannot {command} while {state}")]
    InvalidTransition {
        command: &'static str,
        state: UploadState,
    },

    #[error("No file to retry")]
    NothingToRetry,
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(e) => e.error_code(),
            UploadError::Busy { .. } => "UPLOAD_BUSY",
            UploadError::InvalidTransition { .. } => "INVALID_TRANSITION",
            UploadError::NothingToRetry => "NOTHING_TO_RETRY",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, UploadError::Busy { .. })
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Validation(e) => e.user_message(),
            UploadError::Busy { .. } => {
                "Wait for the current upload to finish or cancel it first".to_string()
            }
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Validation(_) => LogLevel::Warn,
            _ => LogLevel::Debug,
        }
    }
}

/// Failure to read a system-resource sensor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_reasons() {
        let unsupported = ValidationError::UnsupportedFormat {
            declared_type: "video/unknown".to_string(),
            accepted: vec!["video/mp4".to_string()],
        };
        let too_large = ValidationError::FileTooLarge { size: 2, max: 1 };

        assert_eq!(unsupported.reason(), "unsupported format");
        assert_eq!(too_large.reason(), "file too large");
    }

    #[test]
    fn test_unsupported_format_user_message_lists_formats() {
        let err = ValidationError::UnsupportedFormat {
            declared_type: "image/png".to_string(),
            accepted: vec!["video/mp4".to_string(), "video/webm".to_string()],
        };
        assert_eq!(
            err.user_message(),
            "Unsupported file format. Please use: MP4, WEBM"
        );
    }

    #[test]
    fn test_file_too_large_user_message_in_gigabytes() {
        let err = ValidationError::FileTooLarge {
            size: 6_000_000_000,
            max: 5 * 1024 * 1024 * 1024,
        };
        assert_eq!(err.user_message(), "File too large. Maximum size: 5.0GB");
    }

    #[test]
    fn test_upload_error_metadata() {
        let busy = UploadError::Busy {
            state: UploadState::Uploading,
        };
        assert_eq!(busy.error_code(), "UPLOAD_BUSY");
        assert!(busy.is_recoverable());
        assert_eq!(busy.to_string(), "An upload is already uploading");

        let invalid = UploadError::InvalidTransition {
            command: "cancel",
            state: UploadState::Idle,
        };
        assert_eq!(invalid.to_string(), "Cannot cancel while idle");
        assert_eq!(invalid.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_validation_error_converts_into_upload_error() {
        let err: UploadError = ValidationError::FileTooLarge { size: 10, max: 5 }.into();
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_processing_error_client_message() {
        let err = ProcessingError::Failed("encoder crashed".to_string());
        assert_eq!(err.client_message(), "Failed to process file. Please try again.");
        assert_eq!(err.log_level(), LogLevel::Error);
    }
}
