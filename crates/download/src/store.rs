use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use crate::DownloadError;

/// What [`FileStore::list`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub recursive: bool,
    pub include_files: bool,
    pub include_dirs: bool,
}

impl ListOptions {
    pub const fn files() -> Self {
        Self {
            recursive: true,
            include_files: true,
            include_dirs: false,
        }
    }

    pub const fn dirs() -> Self {
        Self {
            recursive: true,
            include_files: false,
            include_dirs: true,
        }
    }

    pub const fn all() -> Self {
        Self {
            recursive: true,
            include_files: true,
            include_dirs: true,
        }
    }

    pub const fn shallow(self) -> Self {
        Self {
            recursive: false,
            ..self
        }
    }
}

/// Filesystem operations used by download housekeeping.
pub trait FileStore: Send + Sync {
    /// Entries below `root` (never `root` itself), sorted.
    fn list(&self, root: &Path, opts: ListOptions) -> Vec<PathBuf>;

    /// Modified within the last `settle`, so probably still being written.
    fn is_open(&self, path: &Path, settle: Duration) -> bool;

    fn remove(&self, path: &Path) -> Result<(), DownloadError>;

    /// Move `src` to `dst`, creating parent directories. Returns `dst`.
    fn rename(&self, src: &Path, dst: &Path) -> Result<PathBuf, DownloadError>;

    fn touch(&self, path: &Path) -> Result<(), DownloadError>;

    fn size_kb(&self, path: &Path) -> Option<u64>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;
}

/// [`FileStore`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    fn walk(dir: &Path, opts: ListOptions, entries: &mut Vec<PathBuf>) {
        let read_dir = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "cannot read directory");
                return;
            }
        };

        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if opts.include_dirs {
                    entries.push(path.clone());
                }
                if opts.recursive {
                    Self::walk(&path, opts, entries);
                }
            } else if opts.include_files {
                entries.push(path);
            }
        }
    }
}

impl FileStore for LocalStore {
    fn list(&self, root: &Path, opts: ListOptions) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        Self::walk(root, opts, &mut entries);
        entries.sort();
        entries
    }

    fn is_open(&self, path: &Path, settle: Duration) -> bool {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| SystemTime::now().duration_since(t).ok())
            .is_some_and(|age| age < settle)
    }

    fn remove(&self, path: &Path) -> Result<(), DownloadError> {
        if path.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        debug!(path = %path.display(), "removed");
        Ok(())
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<PathBuf, DownloadError> {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(src, dst)?;
        debug!(src = %src.display(), dst = %dst.display(), "renamed");
        Ok(dst.to_path_buf())
    }

    fn touch(&self, path: &Path) -> Result<(), DownloadError> {
        File::open(path)?.set_modified(SystemTime::now())?;
        Ok(())
    }

    fn size_kb(&self, path: &Path) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len() / 1024)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// `path`, or the first free `path-N`, keeping any extension.
pub fn unique_path(store: &dyn FileStore, path: &Path) -> PathBuf {
    if !store.exists(path) {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| path.with_file_name(format!("{stem}-{n}{ext}")))
        .find(|p| !store.exists(p))
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("a/one.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("a/b/two.txt"), b"x").unwrap();
        dir
    }

    #[test]
    fn list_variants() {
        let dir = tree();
        let root = dir.path();
        let store = LocalStore;

        assert_eq!(
            store.list(root, ListOptions::files()),
            vec![root.join("a/b/two.txt"), root.join("a/one.txt"), root.join("top.txt")]
        );
        assert_eq!(
            store.list(root, ListOptions::dirs()),
            vec![root.join("a"), root.join("a/b")]
        );
        assert_eq!(
            store.list(root, ListOptions::all().shallow()),
            vec![root.join("a"), root.join("top.txt")]
        );
    }

    #[test]
    fn rename_creates_parents() {
        let dir = tree();
        let store = LocalStore;
        let dst = dir.path().join("x/y/top.txt");
        let res = store.rename(&dir.path().join("top.txt"), &dst).unwrap();
        assert_eq!(res, dst);
        assert!(dst.exists());
    }

    #[test]
    fn remove_file_and_dir() {
        let dir = tree();
        let store = LocalStore;
        store.remove(&dir.path().join("top.txt")).unwrap();
        store.remove(&dir.path().join("a")).unwrap();
        assert!(store.list(dir.path(), ListOptions::all()).is_empty());
    }

    #[test]
    fn fresh_file_is_open() {
        let dir = tree();
        let store = LocalStore;
        let file = dir.path().join("top.txt");
        assert!(store.is_open(&file, Duration::from_secs(60)));
        assert!(!store.is_open(&file, Duration::ZERO));
        assert!(!store.is_open(&dir.path().join("missing"), Duration::from_secs(60)));
    }

    #[test]
    fn unique_names() {
        let dir = tree();
        let store = LocalStore;
        assert_eq!(unique_path(&store, &dir.path().join("new")), dir.path().join("new"));
        assert_eq!(unique_path(&store, &dir.path().join("a")), dir.path().join("a-1"));
        assert_eq!(
            unique_path(&store, &dir.path().join("top.txt")),
            dir.path().join("top-1.txt")
        );
    }
}
