//! Frame Evolve Core Library
//!
//! This crate provides the domain models, error types, configuration, display
//! formatters and status presentation shared by every Frame Evolve component.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod hooks;
pub mod models;
pub mod presentation;
pub mod queue;

// Re-export commonly used types
pub use config::{
    ConfigError, LifecycleConfig, SimulationConfig, UploadConfig, ValidationConstraints,
};
pub use error::{
    ErrorMetadata, ExtractionError, LogLevel, ProcessingError, SensorError, UploadError,
    ValidationError,
};
pub use hooks::{ResourceReading, ResourceSensor};
pub use models::{
    FailureKind, FileHandle, MediaMetadata, ProgressSnapshot, Resolution, SessionId,
    UploadEvent, UploadFailure, UploadOutcome, UploadState,
};
pub use presentation::{FileDetails, QualityBadge, StatusIcon, StatusTone, StatusView};
pub use queue::{QueueIndicator, QueueItemStatus, QueueSummary};
