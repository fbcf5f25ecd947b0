pub mod archive;
pub mod config;
pub mod download;
pub mod media;
pub mod probe;
pub mod store;

use std::path::PathBuf;
use thiserror::Error;

pub use archive::{ArchiveHandler, SevenZip};
pub use config::{DownloadConfig, Window};
pub use download::Downloads;
pub use media::{MediaInfo, MediaProbe, kind_of};
pub use probe::FfprobeProbe;
pub use store::{FileStore, ListOptions, LocalStore};

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("{tool} failed to start: {message}")]
    Spawn { tool: String, message: String },
    #[error("{tool} failed on {path}: {message}")]
    Command {
        tool: String,
        path: PathBuf,
        message: String,
    },
    #[error("ffprobe output: {0}")]
    ProbeOutput(String),
    #[error("invalid download config: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
