//! Human-readable formatting of sizes, durations, bitrates and media properties.

use crate::models::Resolution;

const SIZE_UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];
const BITRATE_UNITS: [&str; 4] = ["bps", "Kbps", "Mbps", "Gbps"];

/// Format a byte count with binary units, trimming trailing zeros ("1.5 GB", "1 KB").
pub fn format_file_size(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let (scaled, i) = scale(bytes as f64, 1024.0, SIZE_UNITS.len());
    format!(
        "{} {}",
        trim_zeros(&format!("{:.*}", decimals, scaled)),
        SIZE_UNITS[i]
    )
}

/// Format milliseconds as `m:ss` or `h:mm:ss`, optionally with centiseconds.
pub fn format_duration(milliseconds: u64, include_ms: bool) -> String {
    if milliseconds == 0 {
        return if include_ms { "0:00.00" } else { "0:00" }.to_string();
    }

    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut formatted = if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    };

    if include_ms {
        formatted.push_str(&format!(".{:02}", (milliseconds % 1000) / 10));
    }

    formatted
}

/// Format a resolution as `1920×1080`, optionally followed by the reduced aspect ratio.
pub fn format_resolution(resolution: &Resolution, include_aspect_ratio: bool) -> String {
    if resolution.width == 0 || resolution.height == 0 {
        return "Unknown".to_string();
    }

    let mut formatted = format!("{}×{}", resolution.width, resolution.height);
    if include_aspect_ratio {
        formatted.push_str(&format!(
            " ({})",
            aspect_ratio(resolution.width, resolution.height)
        ));
    }
    formatted
}

/// Format a bitrate with decimal units ("5.0 Mbps").
pub fn format_bitrate(bits_per_second: u64, decimals: usize) -> String {
    if bits_per_second == 0 {
        return "0 bps".to_string();
    }

    let (scaled, i) = scale(bits_per_second as f64, 1000.0, BITRATE_UNITS.len());
    format!("{:.*} {}", decimals, scaled, BITRATE_UNITS[i])
}

/// Format a percentage, clamped to `0..=100`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    format!("{:.*}%", decimals, value.clamp(0.0, 100.0))
}

/// Truncate text to at most `max_length` characters, ending with `...` when
/// shortened and there is room for it.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    if max_length < 3 {
        return text.chars().take(max_length).collect();
    }
    let keep = max_length.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Display name of a codec identifier.
pub fn format_codec(codec: &str) -> String {
    if codec.trim().is_empty() {
        return "Unknown".to_string();
    }

    let normalized: String = codec
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    match normalized.as_str() {
        "h264" => "H.264".to_string(),
        "h265" | "hevc" => "H.265 (HEVC)".to_string(),
        "vp8" => "VP8".to_string(),
        "vp9" => "VP9".to_string(),
        "av1" => "AV1".to_string(),
        "aac" => "AAC".to_string(),
        "mp3" => "MP3".to_string(),
        "flac" => "FLAC".to_string(),
        "opus" => "Opus".to_string(),
        _ => codec.to_uppercase(),
    }
}

/// Reduced aspect ratio, e.g. `16:9` for 1920x1080.
pub fn aspect_ratio(width: u32, height: u32) -> String {
    let divisor = gcd(width, height);
    if divisor == 0 {
        return "0:0".to_string();
    }
    format!("{}:{}", width / divisor, height / divisor)
}

/// Divide by `base` until the value fits the largest applicable unit.
fn scale(mut value: f64, base: f64, units: usize) -> (f64, usize) {
    let mut i = 0;
    while value >= base && i < units - 1 {
        value /= base;
        i += 1;
    }
    (value, i)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn trim_zeros(value: &str) -> String {
    if value.contains('.') {
        value.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0, 1), "0 Bytes");
        assert_eq!(format_file_size(512, 1), "512 Bytes");
        assert_eq!(format_file_size(1024, 1), "1 KB");
        assert_eq!(format_file_size(1536, 1), "1.5 KB");
        assert_eq!(format_file_size(125_829_120, 1), "120 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024, 1), "5 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0, false), "0:00");
        assert_eq!(format_duration(30_000, false), "0:30");
        assert_eq!(format_duration(150_000, false), "2:30");
        assert_eq!(format_duration(5_445_000, false), "1:30:45");
        assert_eq!(format_duration(61_230, true), "1:01.23");
    }

    #[test]
    fn test_format_resolution() {
        let res = Resolution::new(1920, 1080);
        assert_eq!(format_resolution(&res, false), "1920×1080");
        assert_eq!(format_resolution(&res, true), "1920×1080 (16:9)");
        assert_eq!(format_resolution(&Resolution::new(0, 1080), true), "Unknown");
    }

    #[test]
    fn test_format_bitrate() {
        assert_eq!(format_bitrate(0, 1), "0 bps");
        assert_eq!(format_bitrate(999, 1), "999.0 bps");
        assert_eq!(format_bitrate(5_000_000, 1), "5.0 Mbps");
        assert_eq!(format_bitrate(128_000, 0), "128 Kbps");
    }

    #[test]
    fn test_format_percentage_clamps() {
        assert_eq!(format_percentage(75.4, 0), "75%");
        assert_eq!(format_percentage(120.0, 0), "100%");
        assert_eq!(format_percentage(-3.0, 1), "0.0%");
        assert_eq!(format_percentage(f64::NAN, 0), "0%");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("clip.mp4", 20), "clip.mp4");
        assert_eq!(truncate_text("a_very_long_filename.mp4", 10), "a_very_...");
        assert_eq!(truncate_text("abcdef", 3), "...");
        assert_eq!(truncate_text("abc", 2), "ab");
        assert_eq!(truncate_text("abc", 0), "");
    }

    #[test]
    fn test_format_codec() {
        assert_eq!(format_codec("h264"), "H.264");
        assert_eq!(format_codec("H-265"), "H.265 (HEVC)");
        assert_eq!(format_codec("opus"), "Opus");
        assert_eq!(format_codec("prores"), "PRORES");
        assert_eq!(format_codec(""), "Unknown");
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(1920, 1080), "16:9");
        assert_eq!(aspect_ratio(1440, 1080), "4:3");
        assert_eq!(aspect_ratio(0, 0), "0:0");
    }
}
