use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use frame_evolve_core::{
    FileHandle, LifecycleConfig, MediaMetadata, ProgressSnapshot, SessionId, UploadState,
};

/// Mutable state of the controller, guarded by a single lock.
///
/// `id` is the stale guard: background work captures it at spawn time and must
/// find it unchanged before touching anything else.
pub(crate) struct Session {
    pub id: SessionId,
    pub state: UploadState,
    pub percent: f64,
    pub file: Option<FileHandle>,
    /// Visible from `processing` onward.
    pub metadata: Option<MediaMetadata>,
    /// Extraction result that arrived while still uploading.
    pub pending_metadata: Option<MediaMetadata>,
    pub error_message: Option<String>,
    pub started_at: Option<Instant>,
    pub cancel: CancellationToken,
    pub rng: StdRng,
}

impl Session {
    pub fn new(rng: StdRng) -> Self {
        Self {
            id: SessionId::default(),
            state: UploadState::Idle,
            percent: 0.0,
            file: None,
            metadata: None,
            pending_metadata: None,
            error_message: None,
            started_at: None,
            cancel: CancellationToken::new(),
            rng,
        }
    }

    /// True when the session is idle and holds nothing worth clearing.
    pub fn is_clean(&self) -> bool {
        self.state == UploadState::Idle
            && self.file.is_none()
            && self.metadata.is_none()
            && self.pending_metadata.is_none()
            && self.error_message.is_none()
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.id == id
    }

    /// Stop outstanding work, advance the session id and drop all session data.
    pub fn invalidate(&mut self) -> SessionId {
        self.cancel.cancel();
        self.id = self.id.next();
        self.state = UploadState::Idle;
        self.percent = 0.0;
        self.file = None;
        self.metadata = None;
        self.pending_metadata = None;
        self.error_message = None;
        self.started_at = None;
        self.cancel = CancellationToken::new();
        self.id
    }

    /// Enter `uploading` for `file` under a fresh session id.
    pub fn begin(&mut self, file: FileHandle) -> SessionId {
        let id = self.invalidate();
        self.state = UploadState::Uploading;
        self.file = Some(file);
        self.started_at = Some(Instant::now());
        id
    }

    pub fn fail(&mut self, message: String) {
        self.state = UploadState::Error;
        self.percent = 0.0;
        self.metadata = None;
        self.pending_metadata = None;
        self.error_message = Some(message);
    }

    /// Advance progress by a random increment, clamped to 100. Returns the new value.
    pub fn advance(&mut self, config: &LifecycleConfig) -> f64 {
        let low = config.min_increment.max(0.0);
        let high = config.max_increment.max(low);
        let increment = if high > low {
            self.rng.random_range(low..=high)
        } else {
            low
        };
        self.percent = (self.percent + increment).min(100.0);
        self.percent
    }

    /// Move to `processing`, making any buffered metadata visible.
    pub fn enter_processing(&mut self) {
        self.state = UploadState::Processing;
        self.percent = 100.0;
        if let Some(metadata) = self.pending_metadata.take() {
            self.metadata = Some(metadata);
        }
    }

    pub fn snapshot(&self, config: &LifecycleConfig, processing_estimate: Duration) -> ProgressSnapshot {
        let percent = match self.state {
            UploadState::Idle | UploadState::Error => 0.0,
            UploadState::Complete => 100.0,
            UploadState::Uploading | UploadState::Processing => self.percent.clamp(0.0, 100.0),
        };

        let estimated_remaining_ms = match self.state {
            UploadState::Uploading => Some(self.upload_estimate(config)),
            UploadState::Processing => Some(duration_ms(processing_estimate)),
            _ => None,
        };

        let error_message = match self.state {
            UploadState::Error => self.error_message.clone(),
            _ => None,
        };

        ProgressSnapshot {
            session_id: self.id,
            state: self.state,
            percent,
            estimated_remaining_ms,
            error_message,
        }
    }

    fn upload_estimate(&self, config: &LifecycleConfig) -> u64 {
        let started_at = match self.started_at {
            Some(started_at) if self.percent > 0.0 => started_at,
            _ => return duration_ms(config.initial_estimate),
        };

        let elapsed = started_at.elapsed().as_millis() as f64;
        (elapsed * (100.0 - self.percent) / self.percent).round() as u64
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
