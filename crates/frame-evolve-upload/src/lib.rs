//! Upload lifecycle controller
//!
//! Owns file selection, validation, simulated upload progress, metadata
//! extraction and the processing stage for one file at a time. Callers drive it
//! with [`UploadController::select_file`], [`UploadController::cancel`],
//! [`UploadController::retry`] and [`UploadController::reset`], and observe it
//! through [`UploadController::subscribe`].

pub mod controller;
mod session;

pub use controller::UploadController;
