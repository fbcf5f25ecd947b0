use regex::Regex;
use reltitle_core::MediaKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::DownloadError;
use crate::media::kind_of;

// name.part2.rar
static RE_RAR_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.part(\d+)\.rar$").unwrap());

// name.r00, name.001
static RE_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(r\d{2}|(\d{3}))$").unwrap());

// Everything a multi-volume set shares
static RE_VOLUME_BASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)(\.part\d+\.rar|\.rar|\.r\d{2}|\.\d{3})$").unwrap()
});

/// Inspects and unpacks archives.
#[async_trait::async_trait]
pub trait ArchiveHandler: Send + Sync {
    fn is_archive(&self, path: &Path) -> bool {
        kind_of(path) == MediaKind::Archive
    }

    /// The volume to hand to the unpacker; false for secondary volumes.
    fn is_main_volume(&self, path: &Path) -> bool {
        is_main_volume(path)
    }

    async fn is_protected(&self, path: &Path) -> bool;

    /// Extract next to the archive and return the extracted paths.
    async fn unpack(&self, path: &Path, remove_src: bool) -> Result<Vec<PathBuf>, DownloadError>;
}

pub fn is_main_volume(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    if let Some(caps) = RE_RAR_PART.captures(&name) {
        return caps[1].parse::<u32>() == Ok(1);
    }
    if let Some(caps) = RE_VOLUME.captures(&name) {
        return caps.get(2).is_some_and(|m| m.as_str() == "001");
    }
    true
}

/// Sibling files belonging to the same multi-volume set as `path`,
/// `path` included.
pub fn volumes(path: &Path) -> Vec<PathBuf> {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return vec![];
    };
    let Some(base) = RE_VOLUME_BASE.captures(&name).map(|c| c[1].to_string()) else {
        return vec![path.to_path_buf()];
    };
    let Some(dir) = path.parent() else {
        return vec![path.to_path_buf()];
    };

    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "cannot read directory");
            return vec![path.to_path_buf()];
        }
    };

    let mut res: Vec<PathBuf> = read_dir
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy())
                .and_then(|n| RE_VOLUME_BASE.captures(&n).map(|c| c[1].to_string()))
                .is_some_and(|b| b == base)
        })
        .collect();
    if !res.iter().any(|p| p == path) {
        res.push(path.to_path_buf());
    }
    res.sort();
    res
}

/// [`ArchiveHandler`] backed by the `7z` binary.
#[derive(Debug, Clone)]
pub struct SevenZip {
    bin: PathBuf,
}

impl Default for SevenZip {
    fn default() -> Self {
        Self::new("7z")
    }
}

impl SevenZip {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// `7z l -slt` output. An empty password keeps 7z from prompting.
    async fn list(&self, path: &Path) -> Result<std::process::Output, DownloadError> {
        tokio::process::Command::new(&self.bin)
            .args(["l", "-slt", "-p"])
            .arg(path)
            .output()
            .await
            .map_err(|e| DownloadError::Spawn {
                tool: "7z".into(),
                message: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl ArchiveHandler for SevenZip {
    async fn is_protected(&self, path: &Path) -> bool {
        match self.list(path).await {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                listing_is_protected(&stdout) || listing_is_protected(&stderr)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot list archive");
                false
            }
        }
    }

    async fn unpack(&self, path: &Path, remove_src: bool) -> Result<Vec<PathBuf>, DownloadError> {
        let dst = path.parent().unwrap_or(Path::new("."));

        let listing = self.list(path).await?;
        let entries = listed_paths(&String::from_utf8_lossy(&listing.stdout));

        let output = tokio::process::Command::new(&self.bin)
            .args(["x", "-y", "-p"])
            .arg(format!("-o{}", dst.display()))
            .arg(path)
            .output()
            .await
            .map_err(|e| DownloadError::Spawn {
                tool: "7z".into(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DownloadError::Command {
                tool: "7z".into(),
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        debug!(path = %path.display(), files = entries.len(), "unpacked archive");

        if remove_src {
            for volume in volumes(path) {
                if let Err(e) = std::fs::remove_file(&volume) {
                    warn!(path = %volume.display(), error = %e, "cannot remove archive");
                }
            }
        }

        Ok(entries.into_iter().map(|p| dst.join(p)).collect())
    }
}

fn listing_is_protected(text: &str) -> bool {
    text.lines().any(|l| l.trim() == "Encrypted = +")
        || text.contains("Wrong password")
        || text.contains("Can not open encrypted archive")
}

// The first "Path = " block describes the archive itself
fn listed_paths(listing: &str) -> Vec<PathBuf> {
    let Some((_, entries)) = listing.split_once("----------") else {
        return vec![];
    };
    entries
        .lines()
        .filter_map(|l| l.strip_prefix("Path = "))
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_volumes() {
        assert!(is_main_volume(Path::new("a.rar")));
        assert!(is_main_volume(Path::new("a.part1.rar")));
        assert!(is_main_volume(Path::new("a.part01.rar")));
        assert!(!is_main_volume(Path::new("a.part02.rar")));
        assert!(!is_main_volume(Path::new("a.r00")));
        assert!(is_main_volume(Path::new("a.7z.001")));
        assert!(!is_main_volume(Path::new("a.7z.002")));
        assert!(is_main_volume(Path::new("a.zip")));
    }

    #[test]
    fn protected_listing() {
        assert!(listing_is_protected("Path = a.avi\nEncrypted = +\n"));
        assert!(!listing_is_protected("Path = a.avi\nEncrypted = -\n"));
        assert!(listing_is_protected("ERROR: a.rar : Can not open encrypted archive. Wrong password?"));
    }

    #[test]
    fn listing_skips_archive_header() {
        let listing = "\
Path = /dl/a.rar
Type = Rar

----------
Path = a.avi
Size = 10

Path = sub/b.nfo
Size = 1
";
        assert_eq!(
            listed_paths(listing),
            vec![PathBuf::from("a.avi"), PathBuf::from("sub/b.nfo")]
        );
    }

    #[test]
    fn volume_set() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.part1.rar", "a.part2.rar", "a.nfo", "b.part1.rar"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let vols = volumes(&dir.path().join("a.part1.rar"));
        assert_eq!(
            vols,
            vec![dir.path().join("a.part1.rar"), dir.path().join("a.part2.rar")]
        );
    }
}
