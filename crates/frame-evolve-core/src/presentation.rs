//! Status presentation
//!
//! Pure view models derived from controller output. [`StatusView`] depends on a
//! [`ProgressSnapshot`] and nothing else, so any front end can render every state
//! (including the terminal ones) without reaching into the controller.

use serde::{Deserialize, Serialize};

use crate::constants::UPLOAD_COMPLETE_MESSAGE;
use crate::format::{
    format_bitrate, format_codec, format_duration, format_file_size, format_percentage,
    format_resolution, truncate_text,
};
use crate::models::{FileHandle, MediaMetadata, ProgressSnapshot, Resolution, UploadState};

/// Icon shown next to a status or detail section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Upload,
    FileVideo,
    Clock,
    CheckCircle,
    AlertCircle,
    Monitor,
    Volume,
}

/// Colour family of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Neutral,
    Info,
    Accent,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub label: String,
    pub icon: StatusIcon,
    pub tone: StatusTone,
    pub show_progress: bool,
    pub percent_text: String,
    pub remaining_text: Option<String>,
    pub message: Option<String>,
    pub can_cancel: bool,
    pub can_retry: bool,
    pub can_reset: bool,
}

impl StatusView {
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        let (label, icon, tone) = match snapshot.state {
            UploadState::Idle => ("Ready", StatusIcon::Upload, StatusTone::Neutral),
            UploadState::Uploading => ("Uploading...", StatusIcon::FileVideo, StatusTone::Info),
            UploadState::Processing => ("Processing...", StatusIcon::Clock, StatusTone::Accent),
            UploadState::Complete => ("Complete", StatusIcon::CheckCircle, StatusTone::Success),
            UploadState::Error => ("Error", StatusIcon::AlertCircle, StatusTone::Danger),
        };

        let active = snapshot.state.is_active();

        let remaining_text = if active {
            snapshot
                .estimated_remaining_ms
                .filter(|ms| *ms > 0)
                .map(|ms| format!("{} remaining", format_duration(ms, false)))
        } else {
            None
        };

        let message = match snapshot.state {
            UploadState::Error => snapshot.error_message.clone(),
            UploadState::Complete => Some(UPLOAD_COMPLETE_MESSAGE.to_string()),
            _ => None,
        };

        Self {
            label: label.to_string(),
            icon,
            tone,
            show_progress: active,
            percent_text: format_percentage(snapshot.percent, 0),
            remaining_text,
            message,
            can_cancel: active,
            can_retry: snapshot.state == UploadState::Error,
            can_reset: snapshot.state.is_terminal(),
        }
    }

    /// One-line text rendering, e.g. `[Uploading...] 42% · 0:30 remaining`.
    pub fn render_line(&self) -> String {
        let mut line = format!("[{}]", self.label);
        if self.show_progress {
            line.push(' ');
            line.push_str(&self.percent_text);
        }
        if let Some(remaining) = &self.remaining_text {
            line.push_str(" · ");
            line.push_str(remaining);
        }
        if let Some(message) = &self.message {
            line.push_str(" - ");
            line.push_str(message);
        }
        line
    }
}

/// Resolution class badge shown in the file details header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityBadge {
    #[serde(rename = "4K")]
    Uhd4k,
    #[serde(rename = "1440p")]
    Qhd1440,
    #[serde(rename = "1080p")]
    FullHd1080,
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "SD")]
    Sd,
}

impl QualityBadge {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let pixels = resolution.pixel_count();
        if pixels >= 3840 * 2160 {
            QualityBadge::Uhd4k
        } else if pixels >= 2560 * 1440 {
            QualityBadge::Qhd1440
        } else if pixels >= 1920 * 1080 {
            QualityBadge::FullHd1080
        } else if pixels >= 1280 * 720 {
            QualityBadge::Hd720
        } else {
            QualityBadge::Sd
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityBadge::Uhd4k => "4K",
            QualityBadge::Qhd1440 => "1440p",
            QualityBadge::FullHd1080 => "1080p",
            QualityBadge::Hd720 => "720p",
            QualityBadge::Sd => "SD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSection {
    pub title: String,
    pub icon: StatusIcon,
    pub items: Vec<DetailItem>,
}

/// File information panel shown once a file is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    pub sections: Vec<DetailSection>,
    pub quality: Option<QualityBadge>,
}

/// Longest file name shown in the details panel.
const NAME_DISPLAY_LENGTH: usize = 40;

fn item(label: &str, value: String) -> DetailItem {
    DetailItem {
        label: label.to_string(),
        value,
    }
}

impl FileDetails {
    pub fn new(file: &FileHandle, metadata: Option<&MediaMetadata>) -> Self {
        let mut sections = vec![DetailSection {
            title: "File Information".to_string(),
            icon: StatusIcon::FileVideo,
            items: vec![
                item("Name", truncate_text(&file.name, NAME_DISPLAY_LENGTH)),
                item("Size", format_file_size(file.size, 1)),
                item("Type", file.type_label()),
                item(
                    "Last Modified",
                    file.last_modified.format("%Y-%m-%d").to_string(),
                ),
            ],
        }];

        if let Some(meta) = metadata {
            sections.push(DetailSection {
                title: "Video Properties".to_string(),
                icon: StatusIcon::Monitor,
                items: vec![
                    item(
                        "Duration",
                        format_duration((meta.duration_seconds * 1000.0) as u64, false),
                    ),
                    item("Resolution", format_resolution(&meta.resolution, false)),
                    item("Frame Rate", format!("{} fps", meta.frame_rate)),
                    item("Aspect Ratio", meta.aspect_ratio.clone()),
                    item("Video Codec", format_codec(&meta.video_codec)),
                    item("Color Space", meta.color_space.clone()),
                ],
            });
            sections.push(DetailSection {
                title: "Audio Properties".to_string(),
                icon: StatusIcon::Volume,
                items: vec![
                    item("Audio Codec", format_codec(&meta.audio_codec)),
                    item("Channels", meta.audio_channels.to_string()),
                    item("Bitrate", format_bitrate(meta.bitrate_bps, 1)),
                ],
            });
        }

        Self {
            sections,
            quality: metadata.map(|m| QualityBadge::from_resolution(&m.resolution)),
        }
    }

    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(quality) = &self.quality {
            lines.push(format!("File Details [{}]", quality.label()));
        } else {
            lines.push("File Details".to_string());
        }
        for section in &self.sections {
            lines.push(format!("  {}", section.title));
            for entry in &section.items {
                lines.push(format!("    {:<14} {}", entry.label, entry.value));
            }
        }
        lines
    }
}
