//! Media metadata extraction
//!
//! No decoding happens here. [`SimulatedMetadataExtractor`] fabricates a plausible
//! record from the declared type and size after a configurable latency.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use frame_evolve_core::format::aspect_ratio;
use frame_evolve_core::{
    ExtractionError, FileHandle, MediaMetadata, Resolution, SimulationConfig,
};

/// Produces [`MediaMetadata`] for a selected file.
///
/// Implementations must return promptly with [`ExtractionError::Cancelled`] once
/// `cancel` fires.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(
        &self,
        file: &FileHandle,
        cancel: &CancellationToken,
    ) -> Result<MediaMetadata, ExtractionError>;
}

/// Video and audio codec pair for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodecProfile {
    video: &'static str,
    audio: &'static str,
}

fn codec_profile(declared_type: &str) -> Option<CodecProfile> {
    let normalized = declared_type.trim().to_lowercase();
    let subtype = normalized.rsplit('/').next().unwrap_or(&normalized);

    let profile = match subtype {
        "mp4" | "m4v" | "mov" | "avi" | "flv" => CodecProfile {
            video: "h264",
            audio: "aac",
        },
        "webm" => CodecProfile {
            video: "vp9",
            audio: "opus",
        },
        "mkv" => CodecProfile {
            video: "hevc",
            audio: "aac",
        },
        "wmv" => CodecProfile {
            video: "wmv3",
            audio: "wma",
        },
        _ => return None,
    };
    Some(profile)
}

pub struct SimulatedMetadataExtractor {
    delay: Duration,
    resolution: Resolution,
    frame_rate: f64,
    bitrate_bps: u64,
}

impl SimulatedMetadataExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            resolution: Resolution::new(1920, 1080),
            frame_rate: 30.0,
            bitrate_bps: 5_000_000,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.metadata_delay)
    }

    fn fabricate(&self, file: &FileHandle) -> Result<MediaMetadata, ExtractionError> {
        if file.size == 0 {
            return Err(ExtractionError::EmptyFile);
        }

        let profile = codec_profile(&file.declared_type)
            .ok_or_else(|| ExtractionError::UnsupportedContainer(file.declared_type.clone()))?;

        let seconds = (file.size as f64 * 8.0 / self.bitrate_bps as f64).ceil();

        Ok(MediaMetadata {
            duration_seconds: seconds.max(1.0),
            resolution: self.resolution,
            frame_rate: self.frame_rate,
            bitrate_bps: self.bitrate_bps,
            video_codec: profile.video.to_string(),
            audio_codec: profile.audio.to_string(),
            audio_channels: 2,
            aspect_ratio: aspect_ratio(self.resolution.width, self.resolution.height),
            color_space: "YUV420p".to_string(),
        })
    }
}

impl Default for SimulatedMetadataExtractor {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

#[async_trait]
impl MetadataExtractor for SimulatedMetadataExtractor {
    async fn extract(
        &self,
        file: &FileHandle,
        cancel: &CancellationToken,
    ) -> Result<MediaMetadata, ExtractionError> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }

        let metadata = self.fabricate(file)?;
        tracing::debug!(
            file_name = %file.name,
            duration_seconds = metadata.duration_seconds,
            video_codec = %metadata.video_codec,
            "Simulated metadata extracted"
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_extracts_plausible_metadata() {
        let extractor = SimulatedMetadataExtractor::new(Duration::from_millis(1_000));
        let file = FileHandle::new("clip.mp4", 1_000_000, "video/mp4");

        let metadata = extractor
            .extract(&file, &CancellationToken::new())
            .await
            .unwrap();

        assert!(metadata.is_valid());
        assert_eq!(metadata.video_codec, "h264");
        assert_eq!(metadata.audio_codec, "aac");
        assert_eq!(metadata.aspect_ratio, "16:9");
        assert_eq!(metadata.duration_seconds, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_codec_follows_container() {
        let extractor = SimulatedMetadataExtractor::new(Duration::ZERO);
        let token = CancellationToken::new();

        let webm = extractor
            .extract(&FileHandle::new("a.webm", 10, "video/webm"), &token)
            .await
            .unwrap();
        assert_eq!((webm.video_codec.as_str(), webm.audio_codec.as_str()), ("vp9", "opus"));

        let mkv = extractor
            .extract(&FileHandle::new("a.mkv", 10, "VIDEO/MKV"), &token)
            .await
            .unwrap();
        assert_eq!(mkv.video_codec, "hevc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_file_lasts_at_least_one_second() {
        let extractor = SimulatedMetadataExtractor::new(Duration::ZERO);
        let metadata = extractor
            .extract(&FileHandle::new("tiny.mp4", 1, "video/mp4"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(metadata.duration_seconds, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_file_fails() {
        let extractor = SimulatedMetadataExtractor::new(Duration::ZERO);
        let result = extractor
            .extract(&FileHandle::new("empty.mp4", 0, "video/mp4"), &CancellationToken::new())
            .await;
        assert_eq!(result, Err(ExtractionError::EmptyFile));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_container_fails() {
        let extractor = SimulatedMetadataExtractor::new(Duration::ZERO);
        let result = extractor
            .extract(&FileHandle::new("a.xyz", 10, "video/xyz"), &CancellationToken::new())
            .await;
        assert_eq!(
            result,
            Err(ExtractionError::UnsupportedContainer("video/xyz".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_extraction() {
        let extractor = SimulatedMetadataExtractor::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();

        let result = extractor
            .extract(&FileHandle::new("clip.mp4", 1_000, "video/mp4"), &token)
            .await;
        assert_eq!(result, Err(ExtractionError::Cancelled));
    }
}
