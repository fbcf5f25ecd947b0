//! Download housekeeping: validation, unpacking, album tidying and cleanup
//! of finished downloads.

use regex::{Regex, RegexBuilder};
use reltitle_core::MediaKind;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::DownloadError;
use crate::archive::ArchiveHandler;
use crate::config::DownloadConfig;
use crate::media::{MediaInfo, MediaProbe};
use crate::store::{FileStore, ListOptions, unique_path};

static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Extensions that cannot carry a tv episode.
const NON_TV_EXTENSIONS: &[&str] = &["wmv", "asf"];

pub struct Downloads {
    store: Box<dyn FileStore>,
    probe: Box<dyn MediaProbe>,
    archives: Box<dyn ArchiveHandler>,
    config: DownloadConfig,
    junk: Regex,
}

impl Downloads {
    pub fn new(
        store: Box<dyn FileStore>,
        probe: Box<dyn MediaProbe>,
        archives: Box<dyn ArchiveHandler>,
        config: DownloadConfig,
    ) -> Result<Self, DownloadError> {
        config.validate()?;
        let junk = RegexBuilder::new(&config.junk_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DownloadError::Config(format!("junk_pattern: {e}")))?;
        Ok(Self {
            store,
            probe,
            archives,
            config,
            junk,
        })
    }

    /// Validate one download file.
    ///
    /// `finished_name` is the name the file will have once complete (when
    /// it is downloaded under a temporary name); `finished` makes missing
    /// metadata a failure.
    pub async fn check_file(&self, file: &Path, finished_name: Option<&Path>, finished: bool) -> bool {
        if !self.store.exists(file) {
            return true;
        }

        let real = finished_name.unwrap_or(file);
        let ext = real
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match self.probe.kind(real) {
            MediaKind::Archive => {
                if self.archives.is_main_volume(real) && self.archives.is_protected(file).await {
                    info!(path = %file.display(), "invalid archive: password protected");
                    return false;
                }
                true
            }
            MediaKind::Video => self.check_video(file, &ext, finished).await,
            _ => true,
        }
    }

    async fn check_video(&self, file: &Path, ext: &str, finished: bool) -> bool {
        let size_kb = self.store.size_kb(file).unwrap_or(0);
        if size_kb < self.config.video_check_min_mb * 1024 {
            return true;
        }

        let info = self.probe.probe(file).await.unwrap_or_default();

        if NON_TV_EXTENSIONS.contains(&ext) && info.season.is_some() && info.episode.is_some() {
            info!(path = %file.display(), ext, "invalid extension for a tv episode");
            return false;
        }

        match info.duration_secs {
            Some(secs) => {
                if !self.config.duration_minutes.contains(secs / 60.0) {
                    info!(path = %file.display(), duration = secs, "invalid duration");
                    return false;
                }
            }
            None if finished => {
                info!(path = %file.display(), "failed to get duration");
                return false;
            }
            None => {}
        }

        let kbps = |bits: u64| bits as f64 / 1024.0;
        match (info.video_bitrate, info.audio_bitrate, info.bitrate) {
            (Some(video), Some(audio), _) => {
                if !self.config.video_bitrate_kbps.contains(kbps(video)) {
                    info!(path = %file.display(), bitrate = video, "invalid video bitrate");
                    return false;
                }
                if !self.config.audio_bitrate_kbps.contains(kbps(audio)) {
                    info!(path = %file.display(), bitrate = audio, "invalid audio bitrate");
                    return false;
                }
            }
            (_, _, Some(overall)) => {
                if !self.config.bitrate_kbps.contains(kbps(overall)) {
                    info!(path = %file.display(), bitrate = overall, "invalid bitrate");
                    return false;
                }
            }
            _ if finished => {
                info!(path = %file.display(), "failed to get bitrate");
                return false;
            }
            _ => {}
        }

        true
    }

    /// Every file of a download (file or directory) passes [`Self::check_file`].
    pub async fn check(&self, path: &Path) -> bool {
        let files = if self.store.is_dir(path) {
            self.store.list(path, ListOptions::files())
        } else {
            vec![path.to_path_buf()]
        };
        for file in files {
            if !self.check_file(&file, None, false).await {
                return false;
            }
        }
        true
    }

    /// Move a bare file into its own directory, then unpack the archives
    /// found there. Returns the download directory.
    pub async fn unpack(&self, download: &Path) -> Result<PathBuf, DownloadError> {
        let mut dir = download.to_path_buf();
        if !self.store.is_dir(download) {
            let filename = download
                .file_name()
                .ok_or_else(|| DownloadError::Config(format!("no file name: {}", download.display())))?;
            let dst = unique_path(&*self.store, &download.with_extension(""));
            let moved = self.store.rename(download, &dst.join(filename))?;
            dir = moved.parent().map(Path::to_path_buf).unwrap_or(dst);
        }

        let mut seen: HashSet<PathBuf> = HashSet::new();
        for pass in 0..self.config.unpack_passes {
            // Sorted so that the first volume of a set comes first
            for file in self.store.list(&dir, ListOptions::files()) {
                if !seen.insert(file.clone()) {
                    continue;
                }
                if !self.archives.is_archive(&file) || !self.archives.is_main_volume(&file) {
                    continue;
                }
                // Archives extracted here are picked up by the next pass
                match self.archives.unpack(&file, true).await {
                    Ok(produced) => {
                        debug!(path = %file.display(), pass, files = produced.len(), "unpacked");
                    }
                    Err(e) => warn!(path = %file.display(), error = %e, "cannot unpack archive"),
                }
            }
        }
        Ok(dir)
    }

    /// Remove empty directories and junk files, touch everything else.
    /// Returns `path` if it survived.
    pub fn clean_dir(&self, path: &Path) -> Option<PathBuf> {
        let mut entries = self.store.list(path, ListOptions::all());
        // Children before their parents
        entries.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
        entries.push(path.to_path_buf());

        for entry in entries {
            if self.store.is_dir(&entry) {
                if self.store.list(&entry, ListOptions::all().shallow()).is_empty() {
                    self.remove(&entry);
                    continue;
                }
            } else if self.is_junk(&entry) {
                self.remove(&entry);
                continue;
            }
            if let Err(e) = self.store.touch(&entry) {
                debug!(path = %entry.display(), error = %e, "cannot touch");
            }
        }

        self.store.exists(path).then(|| path.to_path_buf())
    }

    fn is_junk(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|n| self.junk.is_match(&n.to_string_lossy()))
    }

    fn remove(&self, path: &Path) {
        if let Err(e) = self.store.remove(path) {
            warn!(path = %path.display(), error = %e, "cannot remove");
        }
    }

    /// Tidy every directory of audio files below `root` (and `root` itself).
    /// Returns the resulting download directories.
    pub async fn organize_albums(&self, root: &Path) -> Vec<PathBuf> {
        let mut dirs = self.store.list(root, ListOptions::dirs());
        // Renaming a parent would invalidate its children's paths
        dirs.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
        dirs.push(root.to_path_buf());

        let mut paths = Vec::new();
        for dir in dirs {
            if !self.store.exists(&dir) || !self.holds_audio(&dir) {
                continue;
            }
            if let Some(dst) = self.organize_album(&dir, root).await {
                paths.push(dst);
            }
        }

        if self.store.exists(root) && !paths.iter().any(|p| p == root) {
            paths.push(root.to_path_buf());
        }
        paths
    }

    fn holds_audio(&self, dir: &Path) -> bool {
        self.store
            .list(dir, ListOptions::files().shallow())
            .iter()
            .any(|f| self.probe.kind(f) == MediaKind::Audio)
    }

    /// Returns the renamed directory when the album could be named.
    async fn organize_album(&self, dir: &Path, root: &Path) -> Option<PathBuf> {
        let mut tracks: Vec<(PathBuf, MediaInfo)> = Vec::new();
        let mut extras: Vec<PathBuf> = Vec::new();

        for file in self.store.list(dir, ListOptions::files().shallow()) {
            let kind = self.probe.kind(&file);
            let is_playlist = file
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("m3u"));
            let size_kb = self.store.size_kb(&file).unwrap_or(0);

            match kind {
                MediaKind::Audio if !is_playlist => {
                    let info = self.probe.probe(&file).await.unwrap_or_default();
                    tracks.push((file, info));
                }
                MediaKind::Video => extras.push(file),
                MediaKind::Image if size_kb > self.config.album_image_min_kb => extras.push(file),
                _ => self.remove(&file),
            }
        }

        if tracks.is_empty() {
            return None;
        }

        let stats = AlbumStats::collect(tracks.iter().map(|(_, info)| info));

        if stats.titles == tracks.len() && stats.track_numbers.len() == tracks.len() {
            for (file, info) in &tracks {
                let name = track_file_name(info);
                let ext = file
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                if let Err(e) = self.store.rename(file, &dir.join(format!("{name}{ext}"))) {
                    warn!(path = %file.display(), error = %e, "cannot rename track");
                }
            }
        }

        let album_name = stats.album_name()?;

        for file in extras {
            let Some(filename) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if filename.starts_with("00-") {
                continue;
            }
            let dst = dir.join(format!(
                "00-{}-{}",
                album_name.to_lowercase(),
                filename.to_lowercase()
            ));
            if let Err(e) = self.store.rename(&file, &dst) {
                warn!(path = %file.display(), error = %e, "cannot rename album extra");
            }
        }

        let parent = root.parent().unwrap_or(root);
        let dst = parent.join(&album_name);
        if dst == dir {
            return Some(dst);
        }
        let dst = unique_path(&*self.store, &dst);
        match self.store.rename(dir, &dst) {
            Ok(dst) => {
                info!(src = %dir.display(), dst = %dst.display(), "renamed album");
                Some(dst)
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "cannot rename album");
                None
            }
        }
    }

    /// Unpack, tidy and clean every settled top-level entry of `root`.
    pub async fn process(&self, root: &Path) -> Vec<PathBuf> {
        if !self.store.exists(root) {
            error!(path = %root.display(), "download root does not exist");
            return vec![];
        }

        let settle = Duration::from_secs(self.config.settle_secs);
        let mut res = Vec::new();
        for entry in self.store.list(root, ListOptions::all().shallow()) {
            if self.store.is_open(&entry, settle) {
                debug!(path = %entry.display(), "still being written");
                continue;
            }
            let dir = match self.unpack(&entry).await {
                Ok(dir) => dir,
                Err(e) => {
                    warn!(path = %entry.display(), error = %e, "cannot prepare download");
                    continue;
                }
            };
            for path in self.organize_albums(&dir).await {
                if let Some(path) = self.clean_dir(&path) {
                    res.push(path);
                }
            }
        }
        res
    }
}

/// Distinct tag values over the tracks of one directory.
#[derive(Debug, Default)]
struct AlbumStats {
    titles: usize,
    artists: Vec<String>,
    albums: Vec<String>,
    dates: Vec<String>,
    track_numbers: Vec<u32>,
}

impl AlbumStats {
    fn collect<'a>(infos: impl Iterator<Item = &'a MediaInfo>) -> Self {
        fn add<T: PartialEq + Clone>(values: &mut Vec<T>, val: Option<&T>) {
            if let Some(val) = val
                && !values.contains(val)
            {
                values.push(val.clone());
            }
        }

        let mut stats = Self::default();
        for info in infos {
            if info.title.is_some() {
                stats.titles += 1;
            }
            add(&mut stats.artists, info.artist.as_ref());
            add(&mut stats.albums, info.album.as_ref());
            add(&mut stats.dates, info.date.as_ref());
            add(&mut stats.track_numbers, info.track_number.as_ref());
        }
        stats
    }

    /// `Artist-Album[-date]` when artist and album are unanimous.
    fn album_name(&self) -> Option<String> {
        let ([artist], [album]) = (self.artists.as_slice(), self.albums.as_slice()) else {
            return None;
        };
        let date = match self.dates.as_slice() {
            [date] => format!("-{date}"),
            _ => String::new(),
        };
        let name = format!("{}-{}{date}", capitalize(artist), capitalize(album));
        Some(RE_SPACES.replace_all(&name, "_").into_owned())
    }
}

/// `NN-artist-title`, lower-cased, whitespace as underscores.
fn track_file_name(info: &MediaInfo) -> String {
    let name = format!(
        "{:02}-{}-{}",
        info.track_number.unwrap_or(0),
        info.artist.as_deref().unwrap_or(""),
        info.title.as_deref().unwrap_or("")
    );
    RE_SPACES.replace_all(&name, "_").to_lowercase()
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: u32, title: &str) -> MediaInfo {
        MediaInfo {
            artist: Some("The Band".into()),
            album: Some("first album".into()),
            title: Some(title.into()),
            track_number: Some(n),
            date: Some("1999".into()),
            ..Default::default()
        }
    }

    #[test]
    fn track_names() {
        assert_eq!(track_file_name(&track(3, "Some  Song")), "03-the_band-some_song");
        assert_eq!(track_file_name(&MediaInfo::default()), "00--");
    }

    #[test]
    fn capitalized() {
        assert_eq!(capitalize("the BAND"), "The band");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn album_name_needs_unanimous_tags() {
        let tracks = [track(1, "a"), track(2, "b")];
        let stats = AlbumStats::collect(tracks.iter());
        assert_eq!(stats.titles, 2);
        assert_eq!(stats.track_numbers, vec![1, 2]);
        assert_eq!(stats.album_name().as_deref(), Some("The_band-First_album-1999"));

        let mut other = track(3, "c");
        other.artist = Some("Other".into());
        let tracks = [track(1, "a"), other];
        assert_eq!(AlbumStats::collect(tracks.iter()).album_name(), None);
    }

    #[test]
    fn date_dropped_when_ambiguous() {
        let mut later = track(2, "b");
        later.date = Some("2001".into());
        let tracks = [track(1, "a"), later];
        assert_eq!(
            AlbumStats::collect(tracks.iter()).album_name().as_deref(),
            Some("The_band-First_album")
        );
    }
}
