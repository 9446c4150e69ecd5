use serde::{Deserialize, Serialize};

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Media properties of a selected file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub duration_seconds: f64,
    pub resolution: Resolution,
    pub frame_rate: f64,
    pub bitrate_bps: u64,
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_channels: u32,
    pub aspect_ratio: String,
    pub color_space: String,
}

impl MediaMetadata {
    /// True when every numeric field is positive and the resolution is non-empty.
    pub fn is_valid(&self) -> bool {
        self.duration_seconds.is_finite()
            && self.duration_seconds > 0.0
            && self.resolution.width > 0
            && self.resolution.height > 0
            && self.frame_rate.is_finite()
            && self.frame_rate > 0.0
            && self.bitrate_bps > 0
            && self.audio_channels > 0
    }
}
