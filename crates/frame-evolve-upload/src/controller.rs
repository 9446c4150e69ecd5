//! Upload lifecycle controller
//!
//! State machine: `idle -> uploading -> processing -> complete | error`.
//!
//! All session state sits behind one async mutex. Every event is broadcast while
//! that mutex is held, so subscribers see events in issuance order and a command
//! that invalidates a session (cancel, reset, a new selection) is ordered strictly
//! before anything a background task could still try to publish. Background tasks
//! capture the [`SessionId`] they were spawned for and re-check it under the lock
//! before every mutation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use frame_evolve_core::{
    ConfigError, ErrorMetadata, FailureKind, FileHandle, LifecycleConfig, LogLevel,
    MediaMetadata, ProcessingError, ProgressSnapshot, SessionId, UploadConfig, UploadError, UploadEvent,
    UploadFailure, UploadOutcome, UploadState, ValidationConstraints,
};
use frame_evolve_processing::{
    validate, MetadataExtractor, ProcessingStage, SimulatedMetadataExtractor,
    SimulatedProcessingStage,
};

use crate::session::Session;

/// Handle to the upload controller. Cloning yields another handle to the same
/// controller.
#[derive(Clone)]
pub struct UploadController {
    inner: Arc<Inner>,
}

struct Inner {
    session: Mutex<Session>,
    events: broadcast::Sender<UploadEvent>,
    config: LifecycleConfig,
    constraints: ValidationConstraints,
    extractor: Arc<dyn MetadataExtractor>,
    stage: Arc<dyn ProcessingStage>,
}

/// Log `error` at the level it declares and return that level.
fn log_error<E>(
    error: &E,
    session_id: SessionId,
    file_name: Option<&str>,
    message: &str,
) -> LogLevel
where
    E: ErrorMetadata + Display,
{
    let level = error.log_level();
    let error_code = error.error_code();
    let recoverable = error.is_recoverable();
    match level {
        LogLevel::Debug => {
            tracing::debug!(
                session_id = %session_id,
                file_name,
                error = %error,
                error_code,
                recoverable,
                "{message}"
            );
        }
        LogLevel::Warn => {
            tracing::warn!(
                session_id = %session_id,
                file_name,
                error = %error,
                error_code,
                recoverable,
                "{message}"
            );
        }
        LogLevel::Error => {
            tracing::error!(
                session_id = %session_id,
                file_name,
                error = %error,
                error_code,
                recoverable,
                "{message}"
            );
        }
    }
    level
}

impl UploadController {
    /// Fails if `config` could never drive a session to completion.
    pub fn new(
        config: LifecycleConfig,
        constraints: ValidationConstraints,
        extractor: Arc<dyn MetadataExtractor>,
        stage: Arc<dyn ProcessingStage>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (events, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session::new(rng)),
                events,
                config,
                constraints,
                extractor,
                stage,
            }),
        })
    }

    /// Controller backed by the simulated extractor and processing stage.
    pub fn from_config(config: &UploadConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let simulation = config.simulation();
        Self::new(
            config.lifecycle(),
            config.constraints(),
            Arc::new(SimulatedMetadataExtractor::from_config(&simulation)),
            Arc::new(SimulatedProcessingStage::from_config(&simulation)),
        )
    }

    /// Receive every event issued after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> ProgressSnapshot {
        let session = self.inner.session.lock().await;
        self.inner.snapshot_of(&session)
    }

    pub async fn state(&self) -> UploadState {
        self.inner.session.lock().await.state
    }

    pub async fn session_id(&self) -> SessionId {
        self.inner.session.lock().await.id
    }

    pub async fn current_file(&self) -> Option<FileHandle> {
        self.inner.session.lock().await.file.clone()
    }

    /// Metadata of the current file. Empty until the session reaches `processing`.
    pub async fn current_metadata(&self) -> Option<MediaMetadata> {
        self.inner.session.lock().await.metadata.clone()
    }

    /// Validate `file` and, if accepted, start a new session for it.
    ///
    /// Rejected while uploading or processing. From `complete` or `error` the
    /// previous session is discarded first.
    pub async fn select_file(&self, file: FileHandle) -> Result<SessionId, UploadError> {
        let mut session = self.inner.session.lock().await;

        if session.state.is_active() {
            let error = UploadError::Busy {
                state: session.state,
            };
            log_error(&error, session.id, Some(file.name.as_str()), "Selection rejected");
            return Err(error);
        }

        if let Err(error) = validate(&file, &self.inner.constraints) {
            let id = session.invalidate();
            let message = error.user_message();
            session.fail(message.clone());

            log_error(&error, id, Some(file.name.as_str()), "File rejected");

            self.inner.publish_snapshot(&session);
            self.inner.publish(UploadEvent::Finished(UploadOutcome::Failed {
                session_id: id,
                failure: UploadFailure {
                    kind: FailureKind::Validation,
                    message,
                },
            }));
            return Err(UploadError::Validation(error));
        }

        let id = session.begin(file.clone());
        tracing::info!(
            session_id = %id,
            file_name = %file.name,
            size = file.size,
            "Upload started"
        );

        self.inner.publish_snapshot(&session);
        Inner::spawn_session(&self.inner, id, file, session.cancel.clone());
        Ok(id)
    }

    /// Abandon the active session and return to `idle`.
    pub async fn cancel(&self) -> Result<(), UploadError> {
        let mut session = self.inner.session.lock().await;

        if !session.state.is_active() {
            let error = UploadError::InvalidTransition {
                command: "cancel",
                state: session.state,
            };
            log_error(&error, session.id, None, "Command rejected");
            return Err(error);
        }

        let previous = session.id;
        let id = session.invalidate();
        tracing::info!(session_id = %previous, next_session_id = %id, "Upload cancelled");

        self.inner.publish_snapshot(&session);
        Ok(())
    }

    /// Re-enter `uploading` for the file of a failed session.
    pub async fn retry(&self) -> Result<SessionId, UploadError> {
        let mut session = self.inner.session.lock().await;

        if session.state != UploadState::Error {
            let error = UploadError::InvalidTransition {
                command: "retry",
                state: session.state,
            };
            log_error(&error, session.id, None, "Command rejected");
            return Err(error);
        }

        let Some(file) = session.file.clone() else {
            let error = UploadError::NothingToRetry;
            log_error(&error, session.id, None, "Command rejected");
            return Err(error);
        };

        let id = session.begin(file.clone());
        tracing::info!(session_id = %id, file_name = %file.name, "Upload retried");

        self.inner.publish_snapshot(&session);
        Inner::spawn_session(&self.inner, id, file, session.cancel.clone());
        Ok(id)
    }

    /// Discard all session data and return to `idle`. Valid from every state.
    pub async fn reset(&self) {
        let mut session = self.inner.session.lock().await;

        if session.is_clean() {
            return;
        }

        let id = session.invalidate();
        tracing::info!(session_id = %id, "Controller reset");

        self.inner.publish_snapshot(&session);
    }
}

impl Inner {
    fn snapshot_of(&self, session: &Session) -> ProgressSnapshot {
        session.snapshot(&self.config, self.stage.expected_duration())
    }

    fn publish(&self, event: UploadEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn publish_snapshot(&self, session: &Session) {
        self.publish(UploadEvent::Snapshot(self.snapshot_of(session)));
    }

    fn spawn_session(
        inner: &Arc<Self>,
        id: SessionId,
        file: FileHandle,
        cancel: CancellationToken,
    ) {
        tokio::spawn(Self::run_extraction(
            Arc::clone(inner),
            id,
            file,
            cancel.clone(),
        ));
        tokio::spawn(Self::run_lifecycle(Arc::clone(inner), id, cancel));
    }

    async fn run_extraction(
        self: Arc<Self>,
        id: SessionId,
        file: FileHandle,
        cancel: CancellationToken,
    ) {
        let result = self.extractor.extract(&file, &cancel).await;

        let mut session = self.session.lock().await;
        if !session.is_current(id) {
            tracing::debug!(session_id = %id, "Discarding metadata for stale session");
            return;
        }

        match result {
            Ok(metadata) => match session.state {
                UploadState::Uploading => session.pending_metadata = Some(metadata),
                UploadState::Processing => session.metadata = Some(metadata),
                state => {
                    tracing::debug!(session_id = %id, state = %state, "Discarding late metadata");
                }
            },
            Err(error) => {
                log_error(&error, id, Some(file.name.as_str()), "Metadata extraction failed");
            }
        }
    }

    async fn run_lifecycle(self: Arc<Self>, id: SessionId, cancel: CancellationToken) {
        if !self.run_upload(id, &cancel).await {
            return;
        }
        self.run_processing(id, &cancel).await;
    }

    /// Tick progress until 100%. Returns false if the session went stale.
    async fn run_upload(&self, id: SessionId, cancel: &CancellationToken) -> bool {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = ticker.tick() => {}
            }

            let mut session = self.session.lock().await;
            if !session.is_current(id) || session.state != UploadState::Uploading {
                return false;
            }

            let percent = session.advance(&self.config);
            tracing::debug!(session_id = %id, percent = percent, "Upload progress");
            self.publish_snapshot(&session);

            if percent >= 100.0 {
                session.enter_processing();
                tracing::info!(
                    session_id = %id,
                    has_metadata = session.metadata.is_some(),
                    "Upload finished, processing"
                );
                self.publish_snapshot(&session);
                return true;
            }
        }
    }

    async fn run_processing(&self, id: SessionId, cancel: &CancellationToken) {
        let (file, metadata) = {
            let session = self.session.lock().await;
            if !session.is_current(id) || session.state != UploadState::Processing {
                return;
            }
            match session.file.clone() {
                Some(file) => (file, session.metadata.clone()),
                None => return,
            }
        };

        let result = self.stage.process(&file, metadata.as_ref(), cancel).await;

        let mut session = self.session.lock().await;
        if !session.is_current(id) || session.state != UploadState::Processing {
            tracing::debug!(session_id = %id, "Discarding processing result for stale session");
            return;
        }

        match result {
            Ok(()) => {
                session.state = UploadState::Complete;
                let metadata = session.metadata.clone();
                tracing::info!(
                    session_id = %id,
                    file_name = %file.name,
                    has_metadata = metadata.is_some(),
                    "Upload complete"
                );
                self.publish_snapshot(&session);
                self.publish(UploadEvent::Finished(UploadOutcome::Completed {
                    session_id: id,
                    file,
                    metadata,
                }));
            }
            Err(error @ ProcessingError::Cancelled) => {
                log_error(&error, id, Some(file.name.as_str()), "Processing cancelled");
            }
            Err(error) => {
                let message = error.client_message();
                session.fail(message.clone());
                log_error(&error, id, Some(file.name.as_str()), "Processing failed");
                self.publish_snapshot(&session);
                self.publish(UploadEvent::Finished(UploadOutcome::Failed {
                    session_id: id,
                    failure: UploadFailure {
                        kind: FailureKind::Processing,
                        message,
                    },
                }));
            }
        }
    }
}
