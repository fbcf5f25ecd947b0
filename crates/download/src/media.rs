use regex::Regex;
use reltitle_core::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "asf", "flv", "webm", "ts", "mpg", "mpeg", "3gp",
    "ogv", "divx", "vob",
];

static AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "oga", "wav", "m4a", "aac", "wma", "ape", "mpc", "m3u",
];

static IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

// Single archives and multi-volume parts (.r00, .001)
static RE_ARCHIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(rar|zip|7z|tar|gz|tgz|bz2|xz|r\d{2}|\d{3})$").unwrap()
});

/// Classify a path by its extension.
pub fn kind_of(path: &Path) -> MediaKind {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if RE_ARCHIVE.is_match(&name) {
        return MediaKind::Archive;
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Video
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Audio
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Image
    } else {
        MediaKind::Other
    }
}

/// Container facts read by a [`MediaProbe`]. Bitrates are in bit/s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub duration_secs: Option<f64>,
    pub bitrate: Option<u64>,
    pub video_bitrate: Option<u64>,
    pub audio_bitrate: Option<u64>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track_number: Option<u32>,
    pub date: Option<String>,
}

/// Classifies files and reads their container metadata.
#[async_trait::async_trait]
pub trait MediaProbe: Send + Sync {
    fn kind(&self, path: &Path) -> MediaKind {
        kind_of(path)
    }

    /// `None` when the file cannot be read as media.
    async fn probe(&self, path: &Path) -> Option<MediaInfo>;
}
