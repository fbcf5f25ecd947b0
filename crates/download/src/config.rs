use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::DownloadError;

/// Open interval: both bounds are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub min: f64,
    pub max: f64,
}

impl Window {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, val: f64) -> bool {
        self.min < val && val < self.max
    }
}

/// Thresholds for download validation and cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub unpack_passes: usize,
    /// Smaller images in an album directory are clutter.
    pub album_image_min_kb: u64,
    /// Smaller videos are not validated.
    pub video_check_min_mb: u64,
    pub duration_minutes: Window,
    pub video_bitrate_kbps: Window,
    pub audio_bitrate_kbps: Window,
    /// Used when per-stream bitrates are unknown.
    pub bitrate_kbps: Window,
    /// Entries modified more recently are still being written.
    pub settle_secs: u64,
    /// Matched against file names, case-insensitively.
    pub junk_pattern: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            unpack_passes: 3,
            album_image_min_kb: 50,
            video_check_min_mb: 100,
            duration_minutes: Window::new(15.0, 240.0),
            video_bitrate_kbps: Window::new(300.0, 10000.0),
            audio_bitrate_kbps: Window::new(30.0, 1000.0),
            bitrate_kbps: Window::new(300.0, 10000.0),
            settle_secs: 60,
            junk_pattern: r"^(\.DS_Store|Thumbs\.db)$".into(),
        }
    }
}

impl DownloadConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, DownloadError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DownloadError> {
        for (name, w) in [
            ("duration_minutes", self.duration_minutes),
            ("video_bitrate_kbps", self.video_bitrate_kbps),
            ("audio_bitrate_kbps", self.audio_bitrate_kbps),
            ("bitrate_kbps", self.bitrate_kbps),
        ] {
            if w.min >= w.max {
                return Err(DownloadError::Config(format!(
                    "{name}: min {} is not below max {}",
                    w.min, w.max
                )));
            }
        }
        Ok(())
    }
}
