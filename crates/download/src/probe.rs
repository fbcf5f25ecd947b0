use std::path::{Path, PathBuf};
use tracing::warn;

use crate::DownloadError;
use crate::media::{MediaInfo, MediaProbe};

/// [`MediaProbe`] backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: PathBuf,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Run ffprobe on a file and parse the JSON output.
    pub async fn run(&self, file: &Path) -> Result<MediaInfo, DownloadError> {
        let output = tokio::process::Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(file)
            .output()
            .await
            .map_err(|e| DownloadError::Spawn {
                tool: "ffprobe".into(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DownloadError::Command {
                tool: "ffprobe".into(),
                path: file.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let raw: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        parse_probe_output(&raw)
    }
}

#[async_trait::async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Option<MediaInfo> {
        match self.run(path).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot probe file");
                None
            }
        }
    }
}

fn parse_probe_output(raw: &serde_json::Value) -> Result<MediaInfo, DownloadError> {
    let format = raw
        .get("format")
        .ok_or_else(|| DownloadError::ProbeOutput("missing 'format'".into()))?;

    let duration_secs = format
        .get("duration")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| *d > 0.0);
    let bitrate = number_field(format, "bit_rate");

    let streams = raw
        .get("streams")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut video_bitrate = None;
    let mut audio_bitrate = None;
    for s in &streams {
        match s.get("codec_type").and_then(|v| v.as_str()).unwrap_or("") {
            "video" if video_bitrate.is_none() => video_bitrate = number_field(s, "bit_rate"),
            "audio" if audio_bitrate.is_none() => audio_bitrate = number_field(s, "bit_rate"),
            _ => {}
        }
    }

    let tags = format.get("tags");
    let tag = |names: &[&str]| tags.and_then(|t| tag_value(t, names));

    Ok(MediaInfo {
        duration_secs,
        bitrate,
        video_bitrate,
        audio_bitrate,
        season: tag(&["season_number", "wm/seasonnumber"]),
        episode: tag(&["episode_sort", "episode_id", "wm/episodenumber"]),
        artist: tag(&["artist", "album_artist"]),
        album: tag(&["album"]),
        title: tag(&["title"]),
        track_number: tag(&["track", "tracknumber"]).and_then(|t| parse_track(&t)),
        date: tag(&["date", "year"]),
    })
}

fn number_field(obj: &serde_json::Value, key: &str) -> Option<u64> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n > 0)
}

// Tag keys vary in case between containers
fn tag_value(tags: &serde_json::Value, names: &[&str]) -> Option<String> {
    let tags = tags.as_object()?;
    names.iter().find_map(|name| {
        tags.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
    })
}

// "3" or "3/12"
fn parse_track(s: &str) -> Option<u32> {
    s.split('/').next()?.trim().parse().ok()
}
