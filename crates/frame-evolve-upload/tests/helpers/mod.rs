//! Test helpers: fixture files, controller builders, test doubles and event collectors.
//!
//! Every controller test runs on paused tokio time, so timer-driven progress is
//! deterministic and sleeps complete instantly.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;

use frame_evolve_core::{
    ExtractionError, FileHandle, LifecycleConfig, MediaMetadata, ProcessingError,
    ProgressSnapshot, Resolution, UploadEvent, UploadOutcome, ValidationConstraints,
};
use frame_evolve_processing::{
    MetadataExtractor, ProcessingStage, SimulatedMetadataExtractor, SimulatedProcessingStage,
};
use frame_evolve_upload::UploadController;

pub const TICK: Duration = Duration::from_millis(200);

pub fn clip() -> FileHandle {
    FileHandle::new("clip.mp4", 1_000_000, "video/mp4")
}

pub fn constraints() -> ValidationConstraints {
    ValidationConstraints::new(["video/mp4", "video/webm"], 5_000_000_000)
}

/// Random increments between 5 and 10 percent per tick.
pub fn lifecycle() -> LifecycleConfig {
    LifecycleConfig {
        tick_interval: TICK,
        min_increment: 5.0,
        max_increment: 10.0,
        rng_seed: Some(7),
        ..LifecycleConfig::default()
    }
}

/// Exactly 10 percent per tick, so uploads take ten ticks (2 seconds).
pub fn fixed_lifecycle() -> LifecycleConfig {
    LifecycleConfig {
        min_increment: 10.0,
        max_increment: 10.0,
        ..lifecycle()
    }
}

pub fn sample_metadata() -> MediaMetadata {
    MediaMetadata {
        duration_seconds: 12.0,
        resolution: Resolution::new(1280, 720),
        frame_rate: 24.0,
        bitrate_bps: 2_500_000,
        video_codec: "h264".to_string(),
        audio_codec: "aac".to_string(),
        audio_channels: 2,
        aspect_ratio: "16:9".to_string(),
        color_space: "YUV420p".to_string(),
    }
}

/// Simulated extractor (1s) and processing stage (3s, never failing).
pub fn simulated_controller(config: LifecycleConfig) -> UploadController {
    UploadController::new(
        config,
        constraints(),
        Arc::new(SimulatedMetadataExtractor::new(Duration::from_secs(1))),
        Arc::new(SimulatedProcessingStage::new(
            Duration::from_secs(3),
            0.0,
            Some(7),
        )),
    )
    .expect("valid lifecycle config")
}

pub fn controller_with(
    config: LifecycleConfig,
    extractor: impl MetadataExtractor + 'static,
    stage: impl ProcessingStage + 'static,
) -> UploadController {
    UploadController::new(config, constraints(), Arc::new(extractor), Arc::new(stage))
        .expect("valid lifecycle config")
}

/// Extractor returning a fixed result after a delay.
pub struct FixedExtractor {
    pub delay: Duration,
    pub result: Result<MediaMetadata, ExtractionError>,
}

impl FixedExtractor {
    pub fn ok(delay: Duration) -> Self {
        Self {
            delay,
            result: Ok(sample_metadata()),
        }
    }

    pub fn failing(delay: Duration, error: ExtractionError) -> Self {
        Self {
            delay,
            result: Err(error),
        }
    }
}

#[async_trait]
impl MetadataExtractor for FixedExtractor {
    async fn extract(
        &self,
        _file: &FileHandle,
        cancel: &CancellationToken,
    ) -> Result<MediaMetadata, ExtractionError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ExtractionError::Cancelled),
            _ = tokio::time::sleep(self.delay) => self.result.clone(),
        }
    }
}

/// Processing stage that replays scripted outcomes, then succeeds.
pub struct ScriptedStage {
    pub delay: Duration,
    outcomes: Mutex<VecDeque<Result<(), ProcessingError>>>,
}

impl ScriptedStage {
    pub fn new(delay: Duration, outcomes: Vec<Result<(), ProcessingError>>) -> Self {
        Self {
            delay,
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl ProcessingStage for ScriptedStage {
    async fn process(
        &self,
        _file: &FileHandle,
        _metadata: Option<&MediaMetadata>,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessingError> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProcessingError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn expected_duration(&self) -> Duration {
        self.delay
    }
}

/// Receive events until a terminal notification arrives (inclusive).
pub async fn collect_until_finished(rx: &mut broadcast::Receiver<UploadEvent>) -> Vec<UploadEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx.recv().await.expect("event channel closed");
        let finished = matches!(event, UploadEvent::Finished(_));
        events.push(event);
        if finished {
            return events;
        }
    }
}

/// Everything already queued on the receiver.
pub fn drain(rx: &mut broadcast::Receiver<UploadEvent>) -> Vec<UploadEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
            Err(TryRecvError::Lagged(n)) => panic!("receiver lagged by {n} events"),
        }
    }
}

pub fn snapshots(events: &[UploadEvent]) -> Vec<ProgressSnapshot> {
    events
        .iter()
        .filter_map(|event| match event {
            UploadEvent::Snapshot(snapshot) => Some(snapshot.clone()),
            UploadEvent::Finished(_) => None,
        })
        .collect()
}

pub fn outcomes(events: &[UploadEvent]) -> Vec<UploadOutcome> {
    events
        .iter()
        .filter_map(|event| match event {
            UploadEvent::Finished(outcome) => Some(outcome.clone()),
            UploadEvent::Snapshot(_) => None,
        })
        .collect()
}
