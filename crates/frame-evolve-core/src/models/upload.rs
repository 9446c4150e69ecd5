use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::{FileHandle, MediaMetadata};

/// Monotonically increasing identifier of a controller session.
///
/// Bumped by every command that starts, replaces or ends a session. Work carrying
/// an older id is stale and must not touch controller state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        SessionId(self.0 + 1)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Complete,
    Error,
}

impl UploadState {
    /// Uploading or processing; the states in which background work runs.
    pub fn is_active(&self) -> bool {
        matches!(self, UploadState::Uploading | UploadState::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Complete | UploadState::Error)
    }
}

impl Display for UploadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadState::Idle => write!(f, "idle"),
            UploadState::Uploading => write!(f, "uploading"),
            UploadState::Processing => write!(f, "processing"),
            UploadState::Complete => write!(f, "complete"),
            UploadState::Error => write!(f, "error"),
        }
    }
}

/// Immutable point-in-time view of a session, superseded wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub session_id: SessionId,
    pub state: UploadState,
    /// Always within `0.0..=100.0`.
    pub percent: f64,
    pub estimated_remaining_ms: Option<u64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Processing,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::Processing => write!(f, "processing"),
        }
    }
}

/// Plain-data description of a fatal session error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Terminal notification of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Completed {
        session_id: SessionId,
        file: FileHandle,
        metadata: Option<MediaMetadata>,
    },
    Failed {
        session_id: SessionId,
        failure: UploadFailure,
    },
}

impl UploadOutcome {
    pub fn session_id(&self) -> SessionId {
        match self {
            UploadOutcome::Completed { session_id, .. } | UploadOutcome::Failed { session_id, .. } => {
                *session_id
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Completed { .. })
    }
}

/// Everything a subscriber receives from the controller, in issuance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UploadEvent {
    Snapshot(ProgressSnapshot),
    Finished(UploadOutcome),
}

impl UploadEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            UploadEvent::Snapshot(snapshot) => snapshot.session_id,
            UploadEvent::Finished(outcome) => outcome.session_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_monotonic() {
        let first = SessionId::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "1");
    }

    #[test]
    fn test_upload_state_classification() {
        assert!(UploadState::Uploading.is_active());
        assert!(UploadState::Processing.is_active());
        assert!(!UploadState::Idle.is_active());
        assert!(UploadState::Complete.is_terminal());
        assert!(UploadState::Error.is_terminal());
        assert!(!UploadState::Processing.is_terminal());
    }

    #[test]
    fn test_upload_state_serializes_snake_case() {
        let json = serde_json::to_string(&UploadState::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = UploadEvent::Finished(UploadOutcome::Failed {
            session_id: SessionId(3),
            failure: UploadFailure {
                kind: FailureKind::Processing,
                message: "boom".to_string(),
            },
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "finished");
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["session_id"], 3);
        assert_eq!(json["failure"]["kind"], "processing");
        assert_eq!(event.session_id(), SessionId(3));
    }
}
