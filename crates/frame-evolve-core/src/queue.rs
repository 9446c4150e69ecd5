//! Processing queue summary shown in the status bar.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::models::UploadOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueItemStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl From<&UploadOutcome> for QueueItemStatus {
    fn from(outcome: &UploadOutcome) -> Self {
        if outcome.is_success() {
            QueueItemStatus::Completed
        } else {
            QueueItemStatus::Failed
        }
    }
}

/// Overall indicator; failures take precedence over activity, activity over results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueIndicator {
    Errors,
    Processing,
    Ready,
    Idle,
}

impl Display for QueueIndicator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            QueueIndicator::Errors => write!(f, "Errors"),
            QueueIndicator::Processing => write!(f, "Processing"),
            QueueIndicator::Ready => write!(f, "Ready"),
            QueueIndicator::Idle => write!(f, "Idle"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueSummary {
    pub fn from_items(items: &[QueueItemStatus]) -> Self {
        items.iter().fold(Self::default(), |mut summary, status| {
            match status {
                QueueItemStatus::Queued => summary.queued += 1,
                QueueItemStatus::Processing => summary.processing += 1,
                QueueItemStatus::Completed => summary.completed += 1,
                QueueItemStatus::Failed => summary.failed += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.queued + self.processing + self.completed + self.failed
    }

    pub fn indicator(&self) -> QueueIndicator {
        if self.failed > 0 {
            QueueIndicator::Errors
        } else if self.processing > 0 {
            QueueIndicator::Processing
        } else if self.completed > 0 {
            QueueIndicator::Ready
        } else {
            QueueIndicator::Idle
        }
    }

    /// Status bar text, e.g. `2 processing • 1 done • 1 failed`. Empty when nothing ran.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.processing > 0 {
            parts.push(format!("{} processing", self.processing));
        }
        if self.completed > 0 {
            parts.push(format!("{} done", self.completed));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        parts.join(" • ")
    }
}
