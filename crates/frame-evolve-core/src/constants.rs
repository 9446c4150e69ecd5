//! Application-wide constants.

/// Product name shown in the status bar.
pub const APP_NAME: &str = "Frame Evolve";

/// Product version shown in the status bar.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Declared media types accepted by the upload flow unless configured otherwise.
pub const SUPPORTED_FORMATS: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/mkv",
    "video/webm",
    "video/flv",
    "video/wmv",
    "video/m4v",
];

pub const BYTES_PER_MB: u64 = 1024 * 1024;
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// 5 GiB
pub const MAX_FILE_SIZE_MB: u64 = 5 * 1024;

pub const TICK_INTERVAL_MS: u64 = 200;
pub const MIN_PROGRESS_INCREMENT: f64 = 0.0;
pub const MAX_PROGRESS_INCREMENT: f64 = 10.0;
pub const PROCESSING_DELAY_MS: u64 = 3_000;
pub const METADATA_DELAY_MS: u64 = 1_000;
pub const INITIAL_ESTIMATE_MS: u64 = 30_000;
pub const EVENT_CAPACITY: usize = 256;
pub const MONITOR_INTERVAL_SECS: u64 = 5;

/// Message attached to a session that failed during processing.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process file. Please try again.";

/// Message shown once a session completes.
pub const UPLOAD_COMPLETE_MESSAGE: &str = "File uploaded successfully and ready for processing";
