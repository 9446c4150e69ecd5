//! File validation, metadata extraction and the processing stage
//!
//! Everything the upload controller calls out to lives here. The controller only
//! sees the [`MetadataExtractor`] and [`ProcessingStage`] traits, so the simulated
//! implementations can be swapped for real ones without touching session logic.

pub mod metadata;
pub mod stage;
pub mod validator;

pub use metadata::{MetadataExtractor, SimulatedMetadataExtractor};
pub use stage::{ProcessingStage, SimulatedProcessingStage};
pub use validator::{validate, FileValidator};
