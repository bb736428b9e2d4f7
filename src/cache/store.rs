//! Content-addressed cache directory
//!
//! Every cached file is named `<checksum><extension>`, so the directory listing
//! itself is the index: nothing else is persisted. Writes go through a hidden
//! temp file and a rename, so an interrupted download never shows up as an entry.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::index::{split_file_name, CacheIndex};

/// Prefix of in-flight download files; hidden, so never indexed
const PARTIAL_PREFIX: &str = ".partial-";

/// Cache store errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to read cache directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Failed to write cache entry {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid cache entry name: {0:?}")]
    InvalidName(String),
}

/// Local directory holding checksum-named files
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Absolute root directory of the cache
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Open the cache at `cache_dir`, creating it if needed
    ///
    /// Relative paths are resolved against the working directory.
    pub fn open(cache_dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let cache_dir = absolute(cache_dir.as_ref()).map_err(|source| CacheError::CreateDir {
            path: cache_dir.as_ref().to_path_buf(),
            source,
        })?;

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o775);
        }
        builder
            .create(&cache_dir)
            .map_err(|source| CacheError::CreateDir {
                path: cache_dir.clone(),
                source,
            })?;

        let store = Self { cache_dir };

        // Clean up partial downloads from an interrupted run
        store.cleanup();

        info!(cache_dir = %store.cache_dir.display(), "Cache store opened");
        Ok(store)
    }

    /// Scan the directory and map every entry's checksum to its extension
    pub fn list_index(&self) -> Result<CacheIndex, CacheError> {
        let mut index = CacheIndex::new();
        for (name, _) in self.entries()? {
            let (checksum, extension) = split_file_name(&name);
            index.insert(checksum.to_string(), extension.to_string());
        }

        debug!(entries = index.len(), "Built cache index");
        Ok(index)
    }

    /// File name of the entry for `checksum`, rejected unless it is a plain
    /// non-hidden name directly inside the cache directory
    pub fn entry_name(checksum: &str, extension: &str) -> Result<String, CacheError> {
        let file_name = format!("{}{}", checksum, extension);
        if checksum.is_empty()
            || checksum.starts_with('.')
            || file_name.contains(['/', '\\', '\0'])
        {
            return Err(CacheError::InvalidName(file_name));
        }
        Ok(file_name)
    }

    /// Store content as `<checksum><extension>`, replacing any previous entry
    pub fn write(&self, checksum: &str, extension: &str, data: &[u8]) -> Result<PathBuf, CacheError> {
        let file_name = Self::entry_name(checksum, extension)?;
        let local_path = self.cache_dir.join(&file_name);
        let write_err = |source| CacheError::Write {
            path: local_path.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .tempfile_in(&self.cache_dir)
            .map_err(write_err)?;
        tmp.write_all(data).map_err(write_err)?;
        tmp.persist(&local_path).map_err(|e| write_err(e.error))?;

        debug!(
            local = %local_path.display(),
            size = data.len(),
            "Stored file in cache"
        );

        Ok(local_path)
    }

    /// Absolute paths of all cache entries, sorted by file name
    pub fn list_paths(&self) -> Result<Vec<PathBuf>, CacheError> {
        Ok(self.entries()?.into_iter().map(|(_, path)| path).collect())
    }

    /// Remove partial downloads left behind by an interrupted write
    pub fn cleanup(&self) {
        if let Ok(read_dir) = fs::read_dir(&self.cache_dir) {
            for entry in read_dir.flatten() {
                if entry.file_name().to_string_lossy().starts_with(PARTIAL_PREFIX) {
                    let path = entry.path();
                    debug!(path = %path.display(), "Removing stale partial download");
                    let _ = fs::remove_file(&path);
                }
            }
        }
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Regular, non-hidden files directly inside the cache directory
    fn entries(&self) -> Result<Vec<(String, PathBuf)>, CacheError> {
        let read_err = |source| CacheError::ReadDir {
            path: self.cache_dir.clone(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.cache_dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            // Follows symlinks, so a linked-in image still counts
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => entries.push((name, entry.path())),
                _ => continue,
            }
        }
        entries.sort();
        Ok(entries)
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
