use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file chosen by the user through the drop zone or the file browser.
///
/// The handle is owned by the caller. The upload controller only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub declared_type: String,
    pub last_modified: DateTime<Utc>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            declared_type: declared_type.into(),
            last_modified: Utc::now(),
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Subtype of the declared type in upper case, e.g. `MP4` for `video/mp4`.
    pub fn type_label(&self) -> String {
        self.declared_type
            .split('/')
            .nth(1)
            .unwrap_or(&self.declared_type)
            .to_uppercase()
    }
}
