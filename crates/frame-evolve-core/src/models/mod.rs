//! Data models for the upload lifecycle
//!
//! Each sub-module represents one part of the data flow: the selected file, the
//! metadata fabricated for it, and the snapshots and outcomes of a session.

mod file;
mod metadata;
mod upload;

pub use file::*;
pub use metadata::*;
pub use upload::*;
